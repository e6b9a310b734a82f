//! Service credentials from the environment
//!
//! Values come from process environment variables, with a `.env` file in the
//! working directory loaded first when present.

use crate::error::CredentialsError;
use std::fmt;
use tracing::{debug, info};
use zeroize::Zeroize;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const AZURE_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const TRANSCRIPTION_TOKEN: &str = "NEWSFORGE_TRANSCRIPTION_TOKEN";

/// Load `.env` into the process environment, if one exists
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }
}

/// OpenAI credentials. Only an API key is needed.
pub struct OpenAICredentials {
    pub api_key: String,
}

/// Azure OpenAI credentials for a single generation deployment
pub struct AzureCredentials {
    pub api_key: String,
    /// e.g. "https://myresource.openai.azure.com"
    pub endpoint_url: String,
    pub deployment: String,
}

impl OpenAICredentials {
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, OPENAI_API_KEY)?,
        })
    }
}

impl AzureCredentials {
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let endpoint_url = required(&lookup, AZURE_ENDPOINT)?;
        if !endpoint_url.starts_with("https://") {
            return Err(CredentialsError::InvalidData(format!(
                "{AZURE_ENDPOINT} must be an https:// URL"
            )));
        }
        Ok(Self {
            api_key: required(&lookup, AZURE_API_KEY)?,
            endpoint_url,
            deployment: required(&lookup, AZURE_DEPLOYMENT)?,
        })
    }
}

/// Optional bearer token for the transcription backend
pub fn transcription_token() -> Option<String> {
    env_var(TRANSCRIPTION_TOKEN)
}

fn env_var(name: &'static str) -> Option<String> {
    std::env::var(name).ok()
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, CredentialsError>
where
    F: Fn(&'static str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CredentialsError::Missing(name))
}

impl fmt::Debug for OpenAICredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAICredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("api_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl Drop for OpenAICredentials {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

impl Drop for AzureCredentials {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}
