use crate::error::{DigestError, Result};
use crate::llm::TextGenerator;
use std::sync::Arc;
use tracing::debug;

/// Soft output cap for summaries, in tokens. Keeps cost and latency bounded;
/// the service treats it as advisory.
const SUMMARY_MAX_TOKENS: u32 = 300;

/// Produces a prose summary of a transcript via the text-generation service.
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl Summarizer {
    /// Create a new summarizer over the given generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }

    /// Override the advisory output cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the summarization prompt.
    fn build_prompt(transcript: &str) -> String {
        format!(
            "Summarize the following transcript in a concise paragraph, \
             highlighting the main topics and key points:\n{transcript}"
        )
    }

    /// Summarize the transcript. A service failure aborts the run.
    pub async fn summarize(&self, transcript: &str) -> Result<String> {
        debug!(
            "Summarizing {} characters with {}",
            transcript.len(),
            self.generator.name()
        );

        let prompt = Self::build_prompt(transcript);
        let summary = self
            .generator
            .generate(&prompt, self.max_tokens)
            .await
            .map_err(|e| DigestError::Summarization(e.to_string()))?;

        Ok(summary)
    }
}
