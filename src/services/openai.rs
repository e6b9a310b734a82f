//! Direct OpenAI client for article generation.
//!
//! Talks to OpenAI's Chat Completions API with the user's own API key.

use super::retry::send_with_retry;
use super::{check_source_size, ArticleGenerator};
use crate::article::{build_instructions, build_source_block, GeneratedArticle, GenerationRequest};
use crate::credentials::OpenAICredentials;
use crate::error::ServiceError;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use zeroize::Zeroize;

/// OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Client for direct OpenAI Chat Completions API calls.
pub struct OpenAIClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for OpenAI Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// Message in the OpenAI request.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from OpenAI Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIClient {
    /// Create a new OpenAI client from credentials.
    pub fn new(creds: &OpenAICredentials, model: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client for OpenAIClient")?;

        Ok(Self {
            api_key: creds.api_key.clone(),
            model: model.to_string(),
            client,
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_instructions(&request.config),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_source_block(&request.selections),
                },
            ],
            temperature: request.config.temperature(),
        }
    }

    /// Extract text from the OpenAI response structure.
    fn extract_text(response: &ChatCompletionResponse) -> Result<String, ServiceError> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ServiceError::InvalidResponse("No text content in OpenAI response".into()))
    }
}

#[async_trait]
impl ArticleGenerator for OpenAIClient {
    #[instrument(skip(self, request), fields(selections = request.selections.len(), model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedArticle, ServiceError> {
        check_source_size(request)?;
        let body = self.build_request(request);

        let response = send_with_retry("openai", || {
            self.client
                .post(OPENAI_API_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
        })
        .await?;

        let chat_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let article = GeneratedArticle::new(Self::extract_text(&chat_response)?);
        info!(words = article.word_count, "Article generated via OpenAI");
        Ok(article)
    }
}

impl Drop for OpenAIClient {
    fn drop(&mut self) {
        // Clear API key from memory
        self.api_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleConfig;
    use crate::selection::SelectionStore;

    fn client() -> OpenAIClient {
        let creds = OpenAICredentials {
            api_key: "sk-test".to_string(),
        };
        OpenAIClient::new(&creds, "gpt-4.1").expect("client builds")
    }

    #[test]
    fn test_request_carries_instructions_and_sources() {
        let mut store = SelectionStore::new();
        store.add_text_selection("Council approved the plan", true);
        let request = GenerationRequest {
            selections: store.selections().to_vec(),
            config: ArticleConfig::default().with_creativity(0),
        };

        let body = client().build_request(&request);
        let json = serde_json::to_string(&body).expect("Failed to serialize");
        assert!(json.contains("gpt-4.1"));
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("Council approved the plan"));
        assert!(json.contains("\"temperature\":0.0"));
    }

    #[test]
    fn test_openai_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Article text here"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse =
            serde_json::from_str(json).expect("Failed to deserialize");
        let text = OpenAIClient::extract_text(&response).expect("Failed to extract text");
        assert_eq!(text, "Article text here");
    }

    #[test]
    fn test_empty_choices_is_invalid_response() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("Failed to deserialize");
        assert!(matches!(
            OpenAIClient::extract_text(&response),
            Err(ServiceError::InvalidResponse(_))
        ));
    }
}
