// src/pipeline/mod.rs
pub mod stage;

use futures::future::join_all;
use std::{path::PathBuf, sync::Arc};
use tokio::time::Instant;
use tracing::{error, info};

use crate::answer::{AnswerClient, AnsweredRow, ChatModel};
use crate::config::Config;
use crate::error::PipelineError;
use crate::ingest::load_csv;
use crate::output::write_answers;
use crate::plan::{plan_batches, BatchGroup};

pub use stage::Stage;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub batches: usize,
    pub groups: usize,
}

/// Tracks the current [`Stage`] and logs every transition.
struct Tracker {
    stage: Stage,
}

impl Tracker {
    fn new() -> Self {
        Tracker { stage: Stage::Init }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        info!(from = %self.stage, to = %next, "stage");
        self.stage = next;
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        error!(stage = %self.stage, error = %err, "run failed");
        self.advance(Stage::Failed);
        err
    }
}

/// Ingest → plan → answer group by group → write.
pub async fn run<M>(config: &Config, model: M) -> Result<RunSummary, PipelineError>
where
    M: ChatModel + 'static,
{
    let start = Instant::now();
    let mut tracker = Tracker::new();

    // ─── 1) ingest ───────────────────────────────────────────────────
    tracker.advance(Stage::Ingesting);
    let input = load_csv(&config.input).map_err(|e| tracker.fail(e.into()))?;
    info!(
        rows = input.rows.len(),
        columns = input.headers.len(),
        "loaded {}",
        config.input.display()
    );

    // ─── 2) plan ─────────────────────────────────────────────────────
    tracker.advance(Stage::Planning);
    let groups = plan_batches(input.rows, config.batch_size, config.concurrency)
        .map_err(|e| tracker.fail(e.into()))?;
    let batches: usize = groups.iter().map(Vec::len).sum();
    info!(
        batches,
        groups = groups.len(),
        batch_size = config.batch_size,
        concurrency = config.concurrency,
        "planned"
    );

    // ─── 3) answer ───────────────────────────────────────────────────
    let group_count = groups.len();
    tracker.advance(Stage::Processing {
        groups: group_count,
    });
    let client = Arc::new(AnswerClient::new(model, input.instructions));
    let answered = process_groups(client, groups)
        .await
        .map_err(|e| tracker.fail(e))?;

    // ─── 4) write ────────────────────────────────────────────────────
    tracker.advance(Stage::Writing);
    write_answers(&config.output, &input.headers, &answered)
        .map_err(|e| tracker.fail(e.into()))?;

    tracker.advance(Stage::Done);
    info!(elapsed = ?start.elapsed(), rows = answered.len(), "all done");
    Ok(RunSummary {
        output: config.output.clone(),
        rows: answered.len(),
        batches,
        groups: group_count,
    })
}

/// Run groups one after another; inside a group every batch is its own task.
/// Results come back in group order, then batch order within each group.
pub async fn process_groups<M>(
    client: Arc<AnswerClient<M>>,
    groups: Vec<BatchGroup>,
) -> Result<Vec<AnsweredRow>, PipelineError>
where
    M: ChatModel + 'static,
{
    let total = groups.len();
    let mut results: Vec<Vec<AnsweredRow>> = Vec::new();

    for (idx, group) in groups.into_iter().enumerate() {
        info!(group = idx + 1, of = total, batches = group.len(), "dispatching");
        let start = Instant::now();

        let handles: Vec<_> = group
            .into_iter()
            .map(|batch| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.answer_batch(batch).await })
            })
            .collect();

        // join_all keeps dispatch order, which keeps row order
        for joined in join_all(handles).await {
            let answered = joined.map_err(|source| PipelineError::Task { group: idx, source })?;
            results.push(answered);
        }
        info!(group = idx + 1, elapsed = ?start.elapsed(), "group complete");
    }

    Ok(results.into_iter().flatten().collect())
}
