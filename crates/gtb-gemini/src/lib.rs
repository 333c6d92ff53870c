//! Gemini adapter (`generateContent`).
//!
//! Implements the `gtb-core` ChatModel port over the Generative Language
//! REST API. The API is stateless, so the adapter rebuilds the chat from the
//! stored turn sequence on every call and returns the extended sequence for
//! the core to store.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gtb_core::{
    domain::{Role, Turn},
    errors::Error,
    ports::{ChatExchange, ChatModel},
    Result,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    /// Build the client. An empty API key is a startup error: the bot must
    /// refuse to start rather than fail on the first message.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("GEMINI_API_KEY must not be empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;

        Ok(Self {
            api_key,
            model: model.into(),
            http,
        })
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

fn build_request(history: &[Turn], text: &str) -> GenerateRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|t| Content {
            role: wire_role(t.role).to_string(),
            parts: vec![Part {
                text: t.text.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part {
            text: text.to_string(),
        }],
    });

    GenerateRequest { contents }
}

fn extract_reply(resp: GenerateResponse) -> Result<String> {
    if let Some(err) = resp.error {
        return Err(Error::External(format!("gemini error: {}", err.message)));
    }

    let reply = resp
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if reply.trim().is_empty() {
        return Err(Error::External("gemini returned an empty reply".to_string()));
    }

    Ok(reply)
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn send_message(&self, history: &[Turn], text: &str) -> Result<ChatExchange> {
        let request = build_request(history, text);
        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, self.api_key);

        let resp = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::External(format!("gemini request error: {e}")))?;

        let status = resp.status();
        debug!("gemini response status: {status}");

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "gemini request failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("gemini json error: {e}")))?;

        let reply = extract_reply(parsed)?;

        let mut updated = history.to_vec();
        updated.push(Turn::user(text));
        updated.push(Turn::model(&reply));

        Ok(ChatExchange {
            reply,
            history: updated,
        })
    }
}
