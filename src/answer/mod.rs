// src/answer/mod.rs
pub mod extract;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

use crate::error::ModelError;
use crate::ingest::{InstructionsRow, Row};
use crate::plan::Batch;

pub use extract::extract_answers;
pub use gemini::GeminiClient;
pub use prompt::build_prompt;

/// Prefix put in front of every model failure written to the Answer column.
pub const MODEL_ERROR_PREFIX: &str = "Gemini API error";

/// A chat endpoint: prompt in, free text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// An input row plus its answer. Only built by [`AnswerClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredRow {
    pub row: Row,
    pub answer: String,
}

/// Sends one batch per request and merges the replies back onto the rows.
pub struct AnswerClient<M> {
    model: M,
    instructions: InstructionsRow,
}

impl<M: ChatModel> AnswerClient<M> {
    pub fn new(model: M, instructions: InstructionsRow) -> Self {
        Self {
            model,
            instructions,
        }
    }

    /// Answer every row of `batch`. Model failures do not escape: they are
    /// written into each row's answer instead.
    #[instrument(level = "debug", skip(self, batch), fields(rows = batch.len()))]
    pub async fn answer_batch(&self, batch: Batch) -> Vec<AnsweredRow> {
        let prompt = build_prompt(&self.instructions, &batch);
        let start = Instant::now();

        match self.model.complete(&prompt).await {
            Ok(text) => {
                let answers = extract_answers(&text);
                debug!(
                    answers = answers.len(),
                    elapsed = ?start.elapsed(),
                    "batch answered"
                );
                merge_answers(batch, answers)
            }
            Err(e) => {
                error!(error = %e, rows = batch.len(), "model call failed");
                annotate_error(batch, &e)
            }
        }
    }
}

/// Attach answers by position; rows without one get an empty answer.
pub fn merge_answers(batch: Batch, answers: Vec<String>) -> Vec<AnsweredRow> {
    let mut answers = answers.into_iter();
    batch
        .into_iter()
        .map(|row| AnsweredRow {
            row,
            answer: answers.next().unwrap_or_default(),
        })
        .collect()
}

/// Mark every row of a failed batch with the error message.
pub fn annotate_error(batch: Batch, err: &ModelError) -> Vec<AnsweredRow> {
    let answer = format!("{MODEL_ERROR_PREFIX}: {err}");
    batch
        .into_iter()
        .map(|row| AnsweredRow {
            row,
            answer: answer.clone(),
        })
        .collect()
}
