// src/config.rs
use clap::Parser;
use std::{path::PathBuf, time::Duration};

use crate::error::ConfigError;

/// Environment variable holding the model API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

// Values people leave in `.env` templates.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your_api_key_here",
    "your-api-key",
    "<your_api_key>",
    "changeme",
];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "batchqa",
    version,
    about = "Answer the questions in a CSV file with Gemini, in batches"
)]
pub struct Args {
    /// Input CSV: header row, instructions row, then one question per row
    #[arg(long, default_value = "questions.csv")]
    pub input: PathBuf,

    /// Output CSV: input columns plus `Answer`
    #[arg(long, default_value = "answers.csv")]
    pub output: PathBuf,

    /// Rows per model request
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: u32,

    /// Requests in flight at once
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: u32,

    #[arg(long, default_value = "gemini-1.5-flash")]
    pub model: String,

    #[arg(
        long,
        default_value = "https://generativelanguage.googleapis.com/v1beta/models"
    )]
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
    pub concurrency: usize,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub api_key: String,
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("batch_size", &self.batch_size)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Combine CLI args with the API key found through `env`.
    pub fn from_args<F>(args: Args, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(env)?;
        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "timeout-secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(Config {
            input: args.input,
            output: args.output,
            batch_size: args.batch_size as usize,
            concurrency: args.concurrency as usize,
            model: args.model,
            endpoint: args.endpoint,
            timeout: Duration::from_secs(args.timeout_secs),
            api_key,
        })
    }
}

/// Look up the API key, rejecting blanks and template placeholders.
pub fn resolve_api_key<F>(env: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(API_KEY_VAR).ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })?;
    let key = raw.trim();
    if key.is_empty() {
        return Err(ConfigError::MissingApiKey { var: API_KEY_VAR });
    }
    if PLACEHOLDER_KEYS.iter().any(|p| key.eq_ignore_ascii_case(p)) {
        return Err(ConfigError::PlaceholderApiKey { var: API_KEY_VAR });
    }
    Ok(key.to_string())
}
