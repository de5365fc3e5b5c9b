//! External LLM summarizer client.
//!
//! Talks to an OpenAI-style chat-completions endpoint. Strictly best
//! effort: a missing key or an exhausted retry budget surfaces as `Err(())`
//! and the caller falls back to the plain formatted answer.

use crate::core::traits::Summarizer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use di::{inject, injectable};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You summarize catalog search results for a shopping assistant. \
Reply with one or two short plain-text sentences pointing out what stands out.";

pub struct LlmSummarizer {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

#[injectable(Summarizer)]
impl LlmSummarizer {
    #[inject]
    pub fn create() -> LlmSummarizer {
        dotenvy::dotenv().ok();

        LlmSummarizer {
            client: reqwest::Client::new(),
            api_key: env::var("SUMMARIZER_API_KEY").ok(),
            api_url: env::var("SUMMARIZER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
            model: env::var("SUMMARIZER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        }
    }

    async fn complete(&self, api_key: &str, text: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            max_tokens: 256,
            messages: vec![
                ChatCompletionMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to summarizer API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Summarizer API error ({status}): {body}");
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse summarizer API response")?;

        Ok(api_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or("")
            .to_owned())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatCompletionMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ()> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("summarizer disabled, no api key configured");
            return Err(());
        };

        let mut delay = Duration::from_millis(250);
        for attempt in 1..=MAX_ATTEMPTS {
            match self.complete(api_key, text).await {
                Ok(summary) => return Ok(summary),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!("summarizer attempt {attempt} failed: {e:#}");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => warn!("summarizer giving up: {e:#}"),
            }
        }

        Err(())
    }
}
