use crate::analysis::{analyze_transcript, AnalysisRecord};
use crate::artifacts::{ArtifactContent, ArtifactWriter};
use crate::audio::probe_duration;
use crate::config::Config;
use crate::error::{DigestError, Result};
use crate::llm::{ChatClient, TextGenerator};
use crate::summarize::Summarizer;
use crate::topics::TopicExtractor;
use crate::transcribe::{Transcriber, WhisperClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

/// Artifact prefixes.
const TRANSCRIPT_PREFIX: &str = "transcription";
const SUMMARY_PREFIX: &str = "summary";
const ANALYSIS_PREFIX: &str = "analysis";

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Minimum number of topics requested from the service.
    pub top_n: usize,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            show_progress: true,
        }
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Summary text as returned by the service.
    pub summary: String,
    /// Computed analytics record.
    pub analysis: AnalysisRecord,
    /// File names of the three written artifacts.
    pub transcript_file: String,
    pub summary_file: String,
    pub analysis_file: String,
}

/// The transcript analysis pipeline.
///
/// Stages run strictly in sequence, and each artifact is written as soon as
/// its content exists, so a later failure never loses an earlier artifact.
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn TextGenerator>,
    writer: ArtifactWriter,
    options: PipelineOptions,
}

impl Pipeline {
    /// Assemble the pipeline with explicit collaborators.
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn TextGenerator>,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            transcriber,
            generator,
            writer,
            options: PipelineOptions::default(),
        }
    }

    /// Assemble the pipeline from configuration, with the real API clients.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| DigestError::Config("OPENAI_API_KEY not set".to_string()))?;

        let transcriber =
            WhisperClient::new(api_key.clone()).with_model(config.transcription_model.clone());
        let generator = ChatClient::new(api_key).with_model(config.generation_model.clone());

        let pipeline = Self::new(
            Arc::new(transcriber),
            Arc::new(generator),
            ArtifactWriter::new(),
        );

        Ok(pipeline.with_options(PipelineOptions {
            top_n: config.top_n_topics,
            ..PipelineOptions::default()
        }))
    }

    /// Replace the run options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full pipeline over one audio file.
    pub async fn run(&self, input: &Path) -> Result<PipelineOutcome> {
        if !input.exists() {
            return Err(DigestError::Input(format!(
                "File not found: {}",
                input.display()
            )));
        }

        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();

        let audio = fs::read(input).await.map_err(|e| {
            DigestError::Input(format!("Failed to read {}: {}", input.display(), e))
        })?;

        // Duration is optional enrichment; probe failures degrade to unknown.
        let duration = probe_duration(input);
        match duration {
            Some(secs) => debug!("Probed audio duration: {:.1}s", secs),
            None => debug!("Audio duration unknown"),
        }

        // ═══════════════════════════════════════════════════════════════════
        // Stage 1: Transcription
        // ═══════════════════════════════════════════════════════════════════
        info!(
            "Stage 1/4: Transcribing {} with {}",
            file_name,
            self.transcriber.name()
        );

        let spinner = self.spinner("Transcribing audio...");
        let transcribed = self.transcriber.transcribe(&audio, &file_name).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let transcript = transcribed?;

        let transcript_file =
            self.writer
                .write(TRANSCRIPT_PREFIX, "md", ArtifactContent::Text(&transcript))?;
        info!("Transcript saved to {}", transcript_file);

        // ═══════════════════════════════════════════════════════════════════
        // Stage 2: Summarization
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 2/4: Summarizing transcript");

        let summarizer = Summarizer::new(self.generator.clone());
        let spinner = self.spinner("Summarizing...");
        let summarized = summarizer.summarize(&transcript).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let summary = summarized?;

        let summary_file =
            self.writer
                .write(SUMMARY_PREFIX, "md", ArtifactContent::Text(&summary))?;
        info!("Summary saved to {}", summary_file);

        // ═══════════════════════════════════════════════════════════════════
        // Stage 3: Topic extraction
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 3/4: Extracting topics");

        let extractor = TopicExtractor::new(self.generator.clone()).with_top_n(self.options.top_n);
        let topics = extractor.extract(&transcript).await?.into_list();
        info!("Extracted {} topics", topics.len());

        // ═══════════════════════════════════════════════════════════════════
        // Stage 4: Analytics
        // ═══════════════════════════════════════════════════════════════════
        info!("Stage 4/4: Computing analytics");

        let analysis = analyze_transcript(&transcript, duration, topics);
        let analysis_file =
            self.writer
                .write(ANALYSIS_PREFIX, "json", ArtifactContent::Record(&analysis))?;
        info!("Analysis saved to {}", analysis_file);

        Ok(PipelineOutcome {
            summary,
            analysis,
            transcript_file,
            summary_file,
            analysis_file,
        })
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Render the console report: summary, analytics JSON, file names.
pub fn render_report(outcome: &PipelineOutcome) -> String {
    let analysis_json =
        serde_json::to_string_pretty(&outcome.analysis).unwrap_or_else(|_| "{}".to_string());

    format!(
        "\nSummary:\n{}\n\nAnalytics:\n{}\n\nFiles saved: {}, {}, {}",
        outcome.summary,
        analysis_json,
        outcome.transcript_file,
        outcome.summary_file,
        outcome.analysis_file
    )
}

/// Print the report to stdout, after all artifacts are on disk.
pub fn print_report(outcome: &PipelineOutcome) {
    println!("{}", render_report(outcome));
}
