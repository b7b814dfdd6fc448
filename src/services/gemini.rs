use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::InferenceSettings;
use crate::services::inference::{truncate, InferenceError, InferenceProvider};

const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
enum Auth {
    /// Gemini API key, sent as the `key` query parameter
    ApiKey(String),
    /// OAuth access token for Vertex AI
    Bearer(String),
}

/// Client for the `generateContent` API shared by Gemini and Vertex AI
#[derive(Debug)]
pub struct GenerativeProvider {
    client: Client,
    url: String,
    auth: Auth,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerativeProvider {
    /// Gemini API client authenticated with an API key
    pub fn gemini(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| InferenceError::Configuration("gemini requires inference.api_key".into()))?;

        let endpoint = settings
            .endpoint
            .as_deref()
            .unwrap_or(GEMINI_DEFAULT_ENDPOINT)
            .trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", endpoint, settings.model);

        Self::build(settings, url, Auth::ApiKey(api_key))
    }

    /// Vertex AI client authenticated with an access token
    pub fn vertex(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let project_id = settings
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| InferenceError::Configuration("vertex requires inference.project_id".into()))?;
        let access_token = settings
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| InferenceError::Configuration("vertex requires inference.access_token".into()))?;

        let default_endpoint = format!("https://{}-aiplatform.googleapis.com", settings.location);
        let endpoint = settings
            .endpoint
            .as_deref()
            .unwrap_or(&default_endpoint)
            .trim_end_matches('/');
        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            endpoint, project_id, settings.location, settings.model
        );

        Self::build(settings, url, Auth::Bearer(access_token))
    }

    fn build(settings: &InferenceSettings, url: String, auth: Auth) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            auth,
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl InferenceProvider for GenerativeProvider {
    fn name(&self) -> &'static str {
        match self.auth {
            Auth::ApiKey(_) => "gemini",
            Auth::Bearer(_) => "vertex",
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let request = self.client.post(&self.url).json(&body);
        let request = match &self.auth {
            Auth::ApiKey(key) => request.query(&[("key", key.as_str())]),
            Auth::Bearer(token) => request.bearer_auth(token),
        };

        tracing::debug!("Calling {} generateContent ({} prompt chars)", self.name(), prompt.len());

        let response = request.send().await.map_err(timeout_aware)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::ApiError(format!(
                "{} returned {}: {}",
                self.name(),
                status,
                truncate(&detail)
            )));
        }

        let reply: GenerateContentResponse = response.json().await.map_err(timeout_aware)?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InferenceError::Unparsable("response contained no text".into()));
        }

        Ok(text)
    }
}

fn timeout_aware(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else {
        InferenceError::RequestError(err)
    }
}
