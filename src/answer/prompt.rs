// src/answer/prompt.rs
use serde::Serialize;

use crate::ingest::{InstructionsRow, Row};

#[derive(Serialize)]
struct Payload<'a> {
    instructions: &'a InstructionsRow,
    questions: &'a [Row],
}

/// Render one request prompt: the instructions row and the batch rows as
/// JSON, followed by the required answer shape.
pub fn build_prompt(instructions: &InstructionsRow, batch: &[Row]) -> String {
    let payload = Payload {
        instructions,
        questions: batch,
    };
    // Serialising string maps into a String cannot fail.
    let data = serde_json::to_string_pretty(&payload).unwrap_or_default();

    format!(
        "You are answering a list of questions taken from a spreadsheet.\n\
         Each question is a JSON object keyed by the spreadsheet's column names.\n\
         Follow the instructions object when writing every answer.\n\
         \n\
         {data}\n\
         \n\
         Return ONLY a JSON array of exactly {n} strings. Element i must be the \
         answer to question i, in the same order as the questions array. \
         Do not include any other text.",
        n = batch.len(),
    )
}
