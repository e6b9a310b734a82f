//! Direct Azure OpenAI client for article generation.
//!
//! Uses the Azure OpenAI Responses API against the user's own deployment.

use super::retry::send_with_retry;
use super::{check_source_size, ArticleGenerator};
use crate::article::{build_instructions, build_source_block, GeneratedArticle, GenerationRequest};
use crate::credentials::AzureCredentials;
use crate::error::ServiceError;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use zeroize::Zeroize;

const API_VERSION: &str = "2025-04-01-preview";

/// Client for direct Azure OpenAI Responses API calls.
pub struct AzureOpenAIClient {
    endpoint_url: String,
    api_key: String,
    deployment: String,
    client: reqwest::Client,
}

/// Request body for Azure OpenAI Responses API.
#[derive(Debug, Serialize)]
struct AzureGenerateRequest {
    model: String,
    input: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Response from Azure OpenAI Responses API.
#[derive(Debug, Deserialize)]
struct AzureGenerateResponse {
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

impl AzureOpenAIClient {
    /// Create a new Azure OpenAI client from credentials.
    pub fn new(creds: &AzureCredentials) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client for AzureOpenAIClient")?;

        Ok(Self {
            endpoint_url: creds.endpoint_url.clone(),
            api_key: creds.api_key.clone(),
            deployment: creds.deployment.clone(),
            client,
        })
    }

    fn responses_url(&self) -> String {
        let endpoint = self.endpoint_url.trim_end_matches('/');
        format!("{endpoint}/openai/responses?api-version={API_VERSION}")
    }

    fn build_request(&self, request: &GenerationRequest) -> AzureGenerateRequest {
        AzureGenerateRequest {
            model: self.deployment.clone(),
            input: vec![
                Message {
                    role: "developer".to_string(),
                    content: build_instructions(&request.config),
                },
                Message {
                    role: "user".to_string(),
                    content: build_source_block(&request.selections),
                },
            ],
            temperature: request.config.temperature(),
        }
    }

    /// Extract text from the Azure response structure.
    fn extract_text(response: &AzureGenerateResponse) -> Result<String, ServiceError> {
        response
            .output
            .iter()
            .filter(|output| output.item_type == "message")
            .flat_map(|output| output.content.iter())
            .find(|content| content.content_type == "output_text" && !content.text.is_empty())
            .map(|content| content.text.clone())
            .ok_or_else(|| ServiceError::InvalidResponse("No text content in Azure response".into()))
    }
}

#[async_trait]
impl ArticleGenerator for AzureOpenAIClient {
    #[instrument(skip(self, request), fields(selections = request.selections.len(), deployment = %self.deployment))]
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedArticle, ServiceError> {
        check_source_size(request)?;
        let body = self.build_request(request);
        let url = self.responses_url();

        let response = send_with_retry("azure", || {
            self.client
                .post(&url)
                .header("api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
        })
        .await?;

        let azure_response: AzureGenerateResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("Failed to parse Azure response: {}", e))
        })?;

        let article = GeneratedArticle::new(Self::extract_text(&azure_response)?);
        info!(words = article.word_count, "Article generated via Azure OpenAI");
        Ok(article)
    }
}

impl Drop for AzureOpenAIClient {
    fn drop(&mut self) {
        // Clear API key from memory
        self.api_key.zeroize();
    }
}
