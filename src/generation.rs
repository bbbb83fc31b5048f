//! Text-generation provider abstraction and implementations.
//!
//! Defines the [`GenerationProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]** — returns errors; used when generation is not configured.
//! - **[`OpenAIProvider`]** — calls the OpenAI Responses API with retry and backoff.
//!
//! The summary composer issues exactly one generation request per summary;
//! this module owns the transport concerns around that single call.
//!
//! # Retry Strategy
//!
//! Transient failures retry with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! `max_retries = 0` disables retry entirely: one request, one outcome.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::GenerationConfig;

/// Trait for text-generation providers.
///
/// The actual request is performed by [`generate`] (kept as a free function
/// due to async trait limitations).
pub trait GenerationProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-5-nano"`).
    fn model_name(&self) -> &str;
}

/// Generate text from instructions and input using the configured provider.
///
/// Dispatches to the appropriate backend based on the config's `provider`
/// field. Returns the generated text, or an error when the provider is
/// disabled, the service rejects the request, or retries are exhausted.
pub async fn generate(config: &GenerationConfig, instructions: &str, input: &str) -> Result<String> {
    match config.provider.as_str() {
        "openai" => generate_openai(config, instructions, input).await,
        "disabled" => bail!("Generation provider is disabled"),
        other => bail!("Unknown generation provider: {}", other),
    }
}

// ============ Disabled Provider ============

/// A no-op generation provider that always returns errors.
///
/// Used when `generation.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

impl GenerationProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
}

// ============ OpenAI Provider ============

/// Generation provider using the OpenAI Responses API.
///
/// Requires the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAIProvider {
    /// Model name (e.g. `"gpt-5-nano"`).
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` is not set in config, or if
    /// `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generation.model required for OpenAI provider"))?;

        if std::env::var("OPENAI_API_KEY").is_err() {
            bail!("OPENAI_API_KEY environment variable not set");
        }

        Ok(Self { model })
    }
}

impl GenerationProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Call the OpenAI Responses API with retry/backoff.
///
/// Sends `POST https://api.openai.com/v1/responses` and returns the text of
/// the response's output message.
async fn generate_openai(
    config: &GenerationConfig,
    instructions: &str,
    input: &str,
) -> Result<String> {
    let api_key =
        std::env::var("OPENAI_API_KEY").map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

    let model = config
        .model
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("generation.model required"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": model,
        "reasoning": { "effort": config.reasoning_effort },
        "instructions": instructions,
        "input": input,
        "temperature": config.temperature,
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, 8s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post("https://api.openai.com/v1/responses")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    return parse_response_text(&json);
                }

                // Rate limited or server error — retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!(
                        "OpenAI API error {}: {}",
                        status,
                        body_text
                    ));
                    continue;
                }

                // Client error (not 429) — don't retry
                let body_text = response.text().await.unwrap_or_default();
                bail!("OpenAI API error {}: {}", status, body_text);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Generation failed after retries")))
}

/// Parse the Responses API output JSON.
///
/// The `output` array carries reasoning items before the message item;
/// the generated text is the first `content` entry of the first message.
fn parse_response_text(json: &serde_json::Value) -> Result<String> {
    let output = json
        .get("output")
        .and_then(|o| o.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing output array"))?;

    for item in output {
        if item.get("type").and_then(|t| t.as_str()) != Some("message") {
            continue;
        }
        let text = item
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|part| part.get("text"))
            .and_then(|t| t.as_str());
        if let Some(text) = text {
            return Ok(text.to_string());
        }
    }

    bail!("Invalid OpenAI response: no message output")
}

/// Create the appropriate [`GenerationProvider`] based on configuration.
///
/// # Errors
///
/// Returns an error for unknown provider names or if the OpenAI provider
/// cannot be initialized (missing model or API key).
pub fn create_provider(config: &GenerationConfig) -> Result<Box<dyn GenerationProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> GenerationConfig {
        GenerationConfig::default()
    }

    #[test]
    fn test_disabled_provider_metadata() {
        let provider = create_provider(&disabled_config()).unwrap();
        assert_eq!(provider.model_name(), "disabled");
    }

    #[tokio::test]
    async fn test_disabled_generate_errors() {
        let err = generate(&disabled_config(), "instructions", "input")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let config = GenerationConfig {
            provider: "carrier-pigeon".to_string(),
            ..GenerationConfig::default()
        };
        let err = generate(&config, "i", "x").await.unwrap_err();
        assert!(err.to_string().contains("Unknown generation provider"));
    }

    #[test]
    fn test_parse_response_skips_reasoning_item() {
        let json = serde_json::json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                {
                    "type": "message",
                    "content": [ { "type": "output_text", "text": "A fine Merlot." } ]
                }
            ]
        });
        assert_eq!(parse_response_text(&json).unwrap(), "A fine Merlot.");
    }

    #[test]
    fn test_parse_response_missing_output() {
        let err = parse_response_text(&serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("missing output"));
    }

    #[test]
    fn test_parse_response_no_message() {
        let json = serde_json::json!({ "output": [ { "type": "reasoning" } ] });
        let err = parse_response_text(&json).unwrap_err();
        assert!(err.to_string().contains("no message output"));
    }
}
