//! External services the wizard awaits
//!
//! Transcription and article generation are injected as trait objects so the
//! wizard never knows which backend (or test fake) it is talking to.

mod azure_openai;
mod openai;
mod retry;
mod transcription;

pub use azure_openai::AzureOpenAIClient;
pub use openai::OpenAIClient;
pub use transcription::{FileTranscriber, HttpTranscriber};

use crate::article::{GeneratedArticle, GenerationRequest};
use crate::error::ServiceError;
use crate::transcript::{Segment, VideoReference};
use async_trait::async_trait;

/// Maximum characters of source material sent for one article
pub const MAX_SOURCE_CHARS: usize = 200_000;

/// Turns a source video into ordered, timestamped segments
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, video: &VideoReference) -> Result<Vec<Segment>, ServiceError>;
}

/// Writes an article from selected material
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GeneratedArticle, ServiceError>;
}

/// Reject requests whose source material exceeds [`MAX_SOURCE_CHARS`]
pub(crate) fn check_source_size(request: &GenerationRequest) -> Result<(), ServiceError> {
    let length = request.source_len();
    if length > MAX_SOURCE_CHARS {
        return Err(ServiceError::SourceTooLarge {
            length,
            max_length: MAX_SOURCE_CHARS,
        });
    }
    Ok(())
}
