use anyhow::{Context, Result};
use batchqa::{config::Args, logging, pipeline, Config, GeminiClient};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) resolve config before touching any file ──────────────────
    let args = Args::parse();
    // a missing .env is fine; the key may come from the real environment
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "could not load .env"),
    }
    let config = Config::from_args(args, |name| std::env::var(name).ok())
        .context("configuration error")?;
    info!(?config, "startup");

    let model = GeminiClient::new(
        &config.endpoint,
        &config.model,
        config.api_key.clone(),
        config.timeout,
    )
    .context("building model client")?;

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let summary = pipeline::run(&config, model)
        .await
        .with_context(|| format!("processing {}", config.input.display()))?;

    println!("Answers written to {}", summary.output.display());
    Ok(())
}
