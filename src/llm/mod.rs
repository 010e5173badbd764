pub mod openai;

use crate::error::Result;
use async_trait::async_trait;

pub use openai::ChatClient;

/// External text-generation service boundary, shared by summarization and
/// topic extraction.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single-turn prompt and return the reply text.
    ///
    /// `max_tokens` is an advisory output cap, not an exact contract.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;
}
