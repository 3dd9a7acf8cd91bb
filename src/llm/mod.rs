//! Completion backends.
//!
//! The dialogue layer only sees [`CompletionBackend`]; Gemini through Rig is
//! the production implementation.

pub mod gemini;

pub use gemini::{GeminiBackend, GeminiConfig};

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::memory::ConversationTurn;

/// Boxed future type for completion calls.
pub type CompletionFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Completion error type.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The call did not finish in time.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
    /// The provider rejected or failed the request.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// The provider answered without any text.
    #[error("completion returned no text")]
    EmptyResponse,
}

/// Convenience result alias for completion calls.
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Something that can continue a conversation.
pub trait CompletionBackend: Send + Sync {
    /// Produce a reply to `prompt` given the prior turns of the channel.
    ///
    /// # Errors
    /// Returns an error if the provider call fails or yields no text.
    fn complete<'a>(
        &'a self,
        history: &'a [ConversationTurn],
        prompt: &'a str,
    ) -> CompletionFuture<'a, CompletionResult<String>>;
}
