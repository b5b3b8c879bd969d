// src/output/mod.rs
use csv::Writer;
use std::{fs, io::Write, path::Path};
use tracing::{info, instrument};

use crate::answer::AnsweredRow;
use crate::error::OutputError;

/// Name of the column appended to the input headers.
pub const ANSWER_COLUMN: &str = "Answer";

/// Write `rows` to `path` as CSV: the input headers plus `Answer`, one
/// record per row, in the order given. Missing parent dirs are created.
#[instrument(level = "info", skip(headers, rows, path), fields(path = %path.as_ref().display(), rows = rows.len()))]
pub fn write_answers<P: AsRef<Path>>(
    path: P,
    headers: &[String],
    rows: &[AnsweredRow],
) -> Result<(), OutputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::Create {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    let file = fs::File::create(path).map_err(|e| OutputError::Create {
        path: path.to_path_buf(),
        source: e,
    })?;

    write_to(file, headers, rows).map_err(|e| match e {
        WriteFailure::Csv(source) => OutputError::Write {
            path: path.to_path_buf(),
            source,
        },
        WriteFailure::Flush(source) => OutputError::Flush {
            path: path.to_path_buf(),
            source,
        },
    })?;

    info!("answers written");
    Ok(())
}

enum WriteFailure {
    Csv(csv::Error),
    Flush(std::io::Error),
}

fn write_to<W: Write>(
    sink: W,
    headers: &[String],
    rows: &[AnsweredRow],
) -> Result<(), WriteFailure> {
    let mut wtr = Writer::from_writer(sink);

    let header_line = headers
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(ANSWER_COLUMN));
    wtr.write_record(header_line).map_err(WriteFailure::Csv)?;

    for answered in rows {
        // rows carry exactly the header keys, in header order
        let record = answered
            .row
            .values()
            .chain(std::iter::once(answered.answer.as_str()));
        wtr.write_record(record).map_err(WriteFailure::Csv)?;
    }

    wtr.flush().map_err(WriteFailure::Flush)
}
