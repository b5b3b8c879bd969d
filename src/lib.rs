pub mod answer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod plan;

pub use answer::{AnswerClient, AnsweredRow, ChatModel, GeminiClient};
pub use config::{Args, Config};
pub use error::{ConfigError, IngestError, ModelError, OutputError, PipelineError, PlanError};
pub use ingest::{load_csv, CsvInput, InstructionsRow, Row};
pub use pipeline::{run, RunSummary, Stage};
pub use plan::{plan_batches, Batch, BatchGroup};
