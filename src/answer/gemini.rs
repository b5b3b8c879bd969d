// src/answer/gemini.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::ChatModel;
use crate::error::{ConfigError, ModelError};

const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// `generateContent` client for the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    url: Url,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let url = generate_url(endpoint, model)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidSetting {
                name: "http client",
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }
}

fn generate_url(endpoint: &str, model: &str) -> Result<Url, ConfigError> {
    let raw = format!(
        "{}/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model.trim().trim_start_matches("models/")
    );
    Url::parse(&raw).map_err(|e| ConfigError::InvalidSetting {
        name: "endpoint",
        reason: format!("{raw}: {e}"),
    })
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let resp = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let mut text = resp.text().await.unwrap_or_default();
            truncate(&mut text, MAX_ERROR_BODY);
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = response_text(parsed).ok_or(ModelError::EmptyResponse)?;
        debug!(chars = text.len(), "model replied");
        Ok(text)
    }
}

fn response_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn truncate(s: &mut String, max: usize) {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn builds_generate_url() -> Result<()> {
        let url = generate_url(
            "https://generativelanguage.googleapis.com/v1beta/models/",
            "models/gemini-1.5-flash",
        )?;
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        Ok(())
    }

    #[test]
    fn rejects_bad_endpoint() {
        assert!(generate_url("not a url", "m").is_err());
    }

    #[test]
    fn request_body_shape() -> Result<()> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body)?;
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        Ok(())
    }

    #[test]
    fn joins_candidate_parts() -> Result<()> {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[\"a\","},{"text":"\"b\"]"}]}}]}"#,
        )?;
        assert_eq!(response_text(resp).as_deref(), Some(r#"["a","b"]"#));
        Ok(())
    }

    #[test]
    fn blocked_reply_has_no_text() -> Result<()> {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)?;
        assert!(response_text(resp).is_none());
        let resp: GenerateResponse = serde_json::from_str(r#"{}"#)?;
        assert!(response_text(resp).is_none());
        Ok(())
    }

    #[test]
    fn truncates_on_char_boundary() {
        let mut s = "héllo".to_string();
        truncate(&mut s, 2);
        assert_eq!(s, "h");
    }
}
