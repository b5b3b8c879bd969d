// src/ingest/mod.rs
use csv::{ErrorKind, ReaderBuilder, StringRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};
use tracing::{debug, instrument, warn};

use crate::error::IngestError;

/// One CSV record keyed by the file's headers, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

/// The row right after the header. Same shape as a data row, but it feeds
/// the prompt instead of being answered.
pub type InstructionsRow = Row;

impl Row {
    /// Pair `values` with `headers`. Short records are padded with empty
    /// strings and surplus values are dropped, so every row carries exactly
    /// the header keys.
    pub fn new<I, S>(headers: &[String], values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter();
        let fields = headers
            .iter()
            .map(|h| (h.clone(), values.next().map(Into::into).unwrap_or_default()))
            .collect();
        Row { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Serialised as a JSON object whose keys follow header order.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A parsed input file: headers, the instructions row, and the question rows.
#[derive(Debug)]
pub struct CsvInput {
    pub headers: Vec<String>,
    pub instructions: InstructionsRow,
    pub rows: Vec<Row>,
}

/// Open `path` and classify its records positionally, after dropping every
/// record whose fields are all empty:
/// - first remaining record → headers
/// - second → instructions
/// - the rest → data rows
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<CsvInput, IngestError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(IngestError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(IngestError::Read {
                path: path.to_path_buf(),
                source: e.into(),
            })
        }
    };
    parse_csv(BufReader::new(file), path)
}

/// Parse CSV content from any reader. `path` is only used in error messages.
pub fn parse_csv<R: Read>(reader: R, path: &Path) -> Result<CsvInput, IngestError> {
    // headers are taken by hand so blank lines above them are skipped too
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // ragged records are padded/truncated in `Row::new`
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut instructions: Option<Row> = None;
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| classify(e, path))?;
        if is_empty_record(&record) {
            skipped += 1;
            continue;
        }

        let Some(cols) = headers.as_ref() else {
            headers = Some(record.iter().map(str::to_string).collect());
            continue;
        };
        if record.len() != cols.len() {
            warn!(
                record = idx + 1,
                expected = cols.len(),
                found = record.len(),
                "record width differs from header"
            );
        }

        let row = Row::new(cols, record.iter());
        if instructions.is_none() {
            instructions = Some(row);
        } else {
            rows.push(row);
        }
    }

    let headers = headers.ok_or_else(|| IngestError::malformed(path, "missing header row"))?;
    let instructions = instructions.ok_or_else(|| {
        IngestError::malformed(path, format!("{MISSING_ROWS} (found none after the header)"))
    })?;
    if rows.is_empty() {
        return Err(IngestError::malformed(
            path,
            format!("{MISSING_ROWS} (found a single row after the header)"),
        ));
    }

    debug!(
        headers = headers.len(),
        rows = rows.len(),
        skipped,
        "ingested csv"
    );
    Ok(CsvInput {
        headers,
        instructions,
        rows,
    })
}

const MISSING_ROWS: &str = "expected an instructions row followed by at least one question row";

fn is_empty_record(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn classify(err: csv::Error, path: &Path) -> IngestError {
    match err.kind() {
        ErrorKind::Io(_) => IngestError::Read {
            path: path.to_path_buf(),
            source: err,
        },
        _ => IngestError::malformed(path, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn parse(content: &str) -> Result<CsvInput, IngestError> {
        parse_csv(Cursor::new(content.as_bytes().to_vec()), Path::new("test.csv"))
    }

    #[test]
    fn classifies_rows_positionally() -> Result<()> {
        let input = parse(
            "Id,Question\n\
             ,Answer in one word\n\
             1,Capital of France?\n\
             2,Largest planet?\n",
        )?;

        assert_eq!(input.headers, vec!["Id", "Question"]);
        assert_eq!(input.instructions.get("Question"), Some("Answer in one word"));
        assert_eq!(input.instructions.get("Id"), Some(""));
        assert_eq!(input.rows.len(), 2);
        assert_eq!(input.rows[0].get("Question"), Some("Capital of France?"));
        assert_eq!(input.rows[1].get("Id"), Some("2"));
        Ok(())
    }

    #[test]
    fn skips_fully_empty_records_before_classifying() -> Result<()> {
        let input = parse(
            "Id,Question\n\
             ,\n\
             ,Be brief\n\
             ,\n\
             1,Why?\n",
        )?;
        assert_eq!(input.instructions.get("Question"), Some("Be brief"));
        assert_eq!(input.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn whitespace_only_records_survive_ingest() -> Result<()> {
        // only strictly empty fields are dropped here; the planner handles blanks
        let input = parse("Id,Question\n,Be brief\n1,Why?\n , \n")?;
        assert_eq!(input.rows.len(), 2);
        Ok(())
    }

    #[test]
    fn ragged_records_match_header_width() -> Result<()> {
        let input = parse("A,B,C\ninstr\n1,2\n1,2,3,4\n")?;
        assert_eq!(input.instructions.len(), 3);
        assert_eq!(input.rows[0].get("C"), Some(""));
        assert_eq!(input.rows[1].values().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        Ok(())
    }

    #[test]
    fn missing_instructions_is_malformed() {
        let err = parse("Id,Question\n").unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
        assert!(err.to_string().contains("instructions"));
    }

    #[test]
    fn missing_data_rows_is_malformed() {
        let err = parse("Id,Question\n,Be brief\n,\n").unwrap_err();
        assert!(err.to_string().contains("at least one question row"));
    }

    #[test]
    fn header_plus_one_row_names_both_requirements() {
        let err = parse("Id,Question\n1,What is 2+2?\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("instructions row"), "{msg}");
        assert!(msg.contains("question row"), "{msg}");
    }

    #[test]
    fn empty_records_above_header_are_skipped() -> Result<()> {
        let input = parse(",\nId,Question\n,Go\n1,x\n")?;
        assert_eq!(input.headers, vec!["Id", "Question"]);
        assert_eq!(input.instructions.get("Question"), Some("Go"));
        assert_eq!(input.rows.len(), 1);
        assert_eq!(input.rows[0].get("Question"), Some("x"));
        Ok(())
    }

    #[test]
    fn only_empty_records_is_missing_header() {
        let err = parse(",,\n,,\n").unwrap_err();
        assert!(err.to_string().contains("missing header row"));
    }

    #[test]
    fn empty_file_is_malformed() {
        let err = parse("").unwrap_err();
        assert!(err.to_string().contains("missing header row"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_csv("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound(_)));
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "Q\nSay hi\n\"Hello, world?\"\n")?;
        let input = load_csv(tmp.path())?;
        assert_eq!(input.rows[0].get("Q"), Some("Hello, world?"));
        Ok(())
    }

    #[test]
    fn row_serialises_in_header_order() -> Result<()> {
        let headers = vec!["b".to_string(), "a".to_string()];
        let row = Row::new(&headers, ["2", "1"]);
        assert_eq!(serde_json::to_string(&row)?, r#"{"b":"2","a":"1"}"#);
        Ok(())
    }
}
