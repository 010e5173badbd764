use crate::error::{DigestError, Result};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// OpenAI Whisper API endpoint.
const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Maximum file size for the Whisper API (25 MB).
const MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

/// OpenAI Whisper API client.
///
/// Requests the plain-text response format, so the full transcript comes back
/// as the response body. No retries are attempted; a failed call aborts the
/// run.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl WhisperClient {
    /// Create a new Whisper client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: "whisper-1".to_string(),
            base_url: WHISPER_API_URL.to_string(),
        }
    }

    /// Set the transcription model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint (tests, compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// MIME type for the upload, derived from the file name.
    fn mime_type(file_name: &str) -> &'static str {
        match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            Some("ogg") => "audio/ogg",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        }
    }

    /// Build the multipart form for the API request.
    fn build_form(&self, audio: &[u8], file_name: &str) -> Result<Form> {
        let file_part = Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(Self::mime_type(file_name))?;

        Ok(Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "text"))
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String> {
        if audio.len() > MAX_FILE_SIZE {
            return Err(DigestError::Transcription(format!(
                "File too large for Whisper API: {} bytes (max {} bytes)",
                audio.len(),
                MAX_FILE_SIZE
            )));
        }

        debug!("Uploading {} bytes as {}", audio.len(), file_name);

        let form = self.build_form(audio, file_name)?;
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Whisper API response status: {}", status);

        if status.is_success() {
            let transcript = response.text().await?;
            return Ok(transcript);
        }

        // Handle error responses
        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(DigestError::Api(format!(
                "Whisper API error: {} ({})",
                api_error.error.message, api_error.error.r#type
            )));
        }

        Err(DigestError::Api(format!(
            "Whisper API error ({}): {}",
            status, error_body
        )))
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }

    fn max_file_size(&self) -> usize {
        MAX_FILE_SIZE
    }
}

// API error response types

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
    #[allow(dead_code)]
    code: Option<String>,
}
