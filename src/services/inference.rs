use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{InferenceSettings, ProviderKind};
use crate::services::gemini::GenerativeProvider;

/// Errors that can occur when calling an inference backend
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Provider returned error: {0}")]
    ApiError(String),

    #[error("Unparsable provider response: {0}")]
    Unparsable(String),

    #[error("Provider call timed out")]
    Timeout,

    #[error("Inference is disabled")]
    Disabled,

    #[error("Invalid inference configuration: {0}")]
    Configuration(String),
}

/// Prompt-in, text-out capability used for address scoring and insight text.
///
/// Callers treat every result as advisory and fall back on failure.
pub trait InferenceProvider: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Generate free text for a prompt
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, InferenceError>> + Send;

    /// Generate a score in [0, 1] for a prompt
    fn score(&self, prompt: &str) -> impl Future<Output = Result<f64, InferenceError>> + Send {
        async move {
            let text = self.complete(prompt).await?;
            parse_score(&text)
        }
    }
}

/// Backend that never answers; every caller takes its fallback path
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

impl InferenceProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
        Err(InferenceError::Disabled)
    }
}

/// The backend selected at startup
#[derive(Debug)]
pub enum InferenceBackend {
    Gemini(GenerativeProvider),
    Vertex(GenerativeProvider),
    Disabled(DisabledProvider),
}

impl InferenceProvider for InferenceBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::Gemini(_) => "gemini",
            Self::Vertex(_) => "vertex",
            Self::Disabled(p) => p.name(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        match self {
            Self::Gemini(p) | Self::Vertex(p) => p.complete(prompt).await,
            Self::Disabled(p) => p.complete(prompt).await,
        }
    }
}

/// Build the configured inference backend
///
/// Called once at startup. The result is shared for the life of the process.
pub fn build_provider(settings: &InferenceSettings) -> Result<InferenceBackend, InferenceError> {
    let backend = match settings.provider {
        ProviderKind::Gemini => InferenceBackend::Gemini(GenerativeProvider::gemini(settings)?),
        ProviderKind::Vertex => InferenceBackend::Vertex(GenerativeProvider::vertex(settings)?),
        ProviderKind::Disabled => InferenceBackend::Disabled(DisabledProvider),
    };

    tracing::info!("Inference backend: {}", backend.name());
    Ok(backend)
}

/// Run an inference future under a deadline, mapping expiry to [`InferenceError::Timeout`]
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, InferenceError>
where
    F: Future<Output = Result<T, InferenceError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .unwrap_or(Err(InferenceError::Timeout))
}

/// Remove a surrounding ```json ... ``` or ``` ... ``` fence, if any
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let body = &trimmed[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[derive(Deserialize)]
struct ScoredReply {
    score: Value,
}

/// Interpret a provider reply as a score in [0, 1]
///
/// Accepts a bare number or a JSON object with a `score` field, optionally
/// fenced as markdown. Values outside [0, 1] are clamped.
pub fn parse_score(text: &str) -> Result<f64, InferenceError> {
    let body = strip_code_fences(text);

    let score = match body.parse::<f64>() {
        Ok(score) => score,
        Err(_) => {
            let reply: ScoredReply = serde_json::from_str(body)
                .map_err(|e| InferenceError::Unparsable(format!("{}: {:?}", e, truncate(body))))?;
            match reply.score {
                Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
                other => {
                    return Err(InferenceError::Unparsable(format!(
                        "score is not numeric: {}",
                        other
                    )))
                }
            }
        }
    };

    if !score.is_finite() {
        return Err(InferenceError::Unparsable(format!(
            "score is not finite: {:?}",
            truncate(body)
        )));
    }

    Ok(score.clamp(0.0, 1.0))
}

pub(crate) fn truncate(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_score("0.85").unwrap(), 0.85);
        assert_eq!(parse_score("  1.0\n").unwrap(), 1.0);
    }

    #[test]
    fn test_parse_json_object() {
        let text = r#"{"score": 0.7, "reasoning": "mentions Gota"}"#;
        assert_eq!(parse_score(text).unwrap(), 0.7);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"score\": \"0.4\", \"reasoning\": \"maybe\"}\n```";
        assert_eq!(parse_score(text).unwrap(), 0.4);

        let plain_fence = "```\n0.9\n```";
        assert_eq!(parse_score(plain_fence).unwrap(), 0.9);
    }

    #[test]
    fn test_parse_clamps() {
        assert_eq!(parse_score("1.7").unwrap(), 1.0);
        assert_eq!(parse_score("-0.2").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_score("probably yes"), Err(InferenceError::Unparsable(_))));
        assert!(matches!(parse_score(r#"{"score": null}"#), Err(InferenceError::Unparsable(_))));
        assert!(matches!(parse_score("NaN"), Err(InferenceError::Unparsable(_))));
        assert!(matches!(parse_score(""), Err(InferenceError::Unparsable(_))));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("here you go ```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let provider = DisabledProvider;
        assert!(matches!(provider.complete("hi").await, Err(InferenceError::Disabled)));
        assert!(matches!(provider.score("hi").await, Err(InferenceError::Disabled)));
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: Result<String, _> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        })
        .await;

        assert!(matches!(result, Err(InferenceError::Timeout)));
    }

    #[test]
    fn test_build_disabled_provider() {
        let settings = InferenceSettings::default();
        let backend = build_provider(&settings).unwrap();
        assert_eq!(backend.name(), "disabled");
    }
}
