pub mod whisper;

use crate::error::Result;
use async_trait::async_trait;

pub use whisper::WhisperClient;

/// External transcription service boundary.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Turn raw audio bytes into a plain-text transcript.
    ///
    /// The file name is used to derive the upload MIME type. Calls are
    /// fire-once; a failure aborts the run.
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String>;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;

    /// Largest payload the provider accepts, in bytes.
    fn max_file_size(&self) -> usize;
}
