//! Integration tests for speechdigest
//!
//! These tests drive the full pipeline with scripted collaborators, without
//! requiring API keys or network access.

use speechdigest::analysis::AnalysisRecord;
use speechdigest::artifacts::ArtifactWriter;
use speechdigest::error::{DigestError, Result};
use speechdigest::llm::TextGenerator;
use speechdigest::pipeline::{render_report, Pipeline, PipelineOptions};
use speechdigest::transcribe::Transcriber;

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Scripted collaborators
// ============================================================================

struct ScriptedTranscriber {
    transcript: &'static str,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTranscriber {
    fn new(transcript: &'static str) -> Self {
        Self {
            transcript,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            transcript: "",
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: &[u8], _file_name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DigestError::Transcription("backend down".to_string()));
        }
        Ok(self.transcript.to_string())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn max_file_size(&self) -> usize {
        usize::MAX
    }
}

struct ScriptedGenerator {
    summary: &'static str,
    topics_reply: &'static str,
    fail_summary: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGenerator {
    fn new(summary: &'static str, topics_reply: &'static str) -> Self {
        Self {
            summary,
            topics_reply,
            fail_summary: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing_summary() -> Self {
        Self {
            summary: "",
            topics_reply: "[]",
            fail_summary: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.starts_with("Summarize") {
            if self.fail_summary {
                return Err(DigestError::Api("summary backend down".to_string()));
            }
            Ok(self.summary.to_string())
        } else {
            Ok(self.topics_reply.to_string())
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn quiet_options() -> PipelineOptions {
    PipelineOptions {
        top_n: 3,
        show_progress: false,
    }
}

fn write_test_wav(path: &Path, seconds: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..(seconds * 16000) {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn artifact_files(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix))
        .collect();
    names.sort();
    names
}

// ============================================================================
// End-to-end pipeline tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.wav");
    write_test_wav(&input, 2);

    // 10 words over 2 seconds of audio is 300 wpm.
    let transcriber = Arc::new(ScriptedTranscriber::new(
        "one two three four five six seven eight nine ten",
    ));
    let generator = Arc::new(ScriptedGenerator::new(
        "A talk about counting.",
        "Here you go: [{\"topic\": \"Counting\", \"mentions\": 10}, {\"topic\": \"Numbers\", \"mentions\": 4}]",
    ));

    let pipeline = Pipeline::new(
        transcriber.clone(),
        generator.clone(),
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let outcome = pipeline.run(&input).await.unwrap();

    // One transcription call, two generation calls (summary + topics).
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);

    // All three artifacts exist and carry the expected content.
    let transcript_path = dir.path().join(&outcome.transcript_file);
    assert_eq!(
        fs::read_to_string(transcript_path).unwrap(),
        "one two three four five six seven eight nine ten"
    );

    let summary_path = dir.path().join(&outcome.summary_file);
    assert_eq!(
        fs::read_to_string(summary_path).unwrap(),
        "A talk about counting."
    );

    let analysis_path = dir.path().join(&outcome.analysis_file);
    let analysis: AnalysisRecord =
        serde_json::from_str(&fs::read_to_string(analysis_path).unwrap()).unwrap();
    assert_eq!(analysis.word_count, 10);
    assert_eq!(analysis.speaking_speed_wpm, Some(300));
    assert_eq!(analysis.frequently_mentioned_topics.len(), 2);
    assert_eq!(analysis.frequently_mentioned_topics[0]["topic"], "Counting");

    // Console report: summary first, then the analytics JSON, then the files.
    let report = render_report(&outcome);
    let summary_at = report.find("A talk about counting.").unwrap();
    let analytics_at = report.find("\"word_count\": 10").unwrap();
    let files_at = report.find("Files saved:").unwrap();
    assert!(summary_at < analytics_at);
    assert!(analytics_at < files_at);
    assert!(report.contains(&outcome.analysis_file));
}

#[tokio::test]
async fn test_pipeline_completes_with_unparseable_topics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.wav");
    write_test_wav(&input, 1);

    let transcriber = Arc::new(ScriptedTranscriber::new("just a few words"));
    let generator = Arc::new(ScriptedGenerator::new(
        "Short summary.",
        "I'm sorry, I cannot list topics for this transcript.",
    ));

    let pipeline = Pipeline::new(
        transcriber,
        generator,
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let outcome = pipeline.run(&input).await.unwrap();
    assert!(outcome.analysis.frequently_mentioned_topics.is_empty());
    assert_eq!(artifact_files(dir.path(), "analysis").len(), 1);
}

#[tokio::test]
async fn test_pipeline_missing_input_makes_no_service_calls() {
    let dir = tempfile::tempdir().unwrap();

    let transcriber = Arc::new(ScriptedTranscriber::new("unused"));
    let generator = Arc::new(ScriptedGenerator::new("unused", "[]"));

    let pipeline = Pipeline::new(
        transcriber.clone(),
        generator.clone(),
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let result = pipeline.run(&dir.path().join("missing.wav")).await;
    match result {
        Err(DigestError::Input(msg)) => assert!(msg.contains("missing.wav")),
        other => panic!("Expected Input error, got {other:?}"),
    }

    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pipeline_keeps_transcript_when_summarization_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.wav");
    write_test_wav(&input, 1);

    let transcriber = Arc::new(ScriptedTranscriber::new("words that should survive"));
    let generator = Arc::new(ScriptedGenerator::failing_summary());

    let pipeline = Pipeline::new(
        transcriber,
        generator,
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let result = pipeline.run(&input).await;
    match result {
        Err(DigestError::Summarization(_)) => {}
        other => panic!("Expected Summarization error, got {other:?}"),
    }

    // The transcript artifact was persisted before the failing stage.
    let transcripts = artifact_files(dir.path(), "transcription");
    assert_eq!(transcripts.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join(&transcripts[0])).unwrap(),
        "words that should survive"
    );
    assert!(artifact_files(dir.path(), "summary").is_empty());
    assert!(artifact_files(dir.path(), "analysis").is_empty());
}

#[tokio::test]
async fn test_pipeline_transcription_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.wav");
    write_test_wav(&input, 1);

    let transcriber = Arc::new(ScriptedTranscriber::failing());
    let generator = Arc::new(ScriptedGenerator::new("unused", "[]"));

    let pipeline = Pipeline::new(
        transcriber,
        generator.clone(),
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let result = pipeline.run(&input).await;
    assert!(matches!(result, Err(DigestError::Transcription(_))));

    assert!(artifact_files(dir.path(), "transcription").is_empty());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pipeline_unknown_duration_leaves_wpm_absent() {
    let dir = tempfile::tempdir().unwrap();
    // Not decodable audio, so the duration probe comes up empty.
    let input = dir.path().join("talk.mp3");
    fs::write(&input, b"not really an mp3").unwrap();

    let transcriber = Arc::new(ScriptedTranscriber::new("five words of transcript here"));
    let generator = Arc::new(ScriptedGenerator::new(
        "Summary.",
        "[{\"topic\": \"Words\", \"mentions\": 5}]",
    ));

    let pipeline = Pipeline::new(
        transcriber,
        generator,
        ArtifactWriter::new().with_dir(dir.path()),
    )
    .with_options(quiet_options());

    let outcome = pipeline.run(&input).await.unwrap();
    assert_eq!(outcome.analysis.word_count, 5);
    assert_eq!(outcome.analysis.speaking_speed_wpm, None);

    let analysis_path = dir.path().join(&outcome.analysis_file);
    let raw = fs::read_to_string(analysis_path).unwrap();
    assert!(raw.contains("\"speaking_speed_wpm\": null"));
}
