use crate::topics::TopicList;
use serde::{Deserialize, Serialize};

/// Analytics computed for one transcript. Built once per run and serialized
/// as the analysis artifact; an absent speaking speed serializes as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub word_count: usize,
    pub speaking_speed_wpm: Option<u64>,
    pub frequently_mentioned_topics: TopicList,
}

/// Combine transcript, optional duration, and extracted topics into a record.
///
/// Pure computation. Word count is whitespace tokenization. Speaking speed is
/// words per minute truncated to an integer, and absent whenever the duration
/// is unknown or not positive: an unknown duration means "unknown", never
/// zero.
pub fn analyze_transcript(
    transcript: &str,
    duration_secs: Option<f64>,
    topics: TopicList,
) -> AnalysisRecord {
    let word_count = transcript.split_whitespace().count();

    let speaking_speed_wpm = match duration_secs {
        Some(secs) if secs > 0.0 => Some((word_count as f64 / (secs / 60.0)) as u64),
        _ => None,
    };

    AnalysisRecord {
        word_count,
        speaking_speed_wpm,
        frequently_mentioned_topics: topics,
    }
}
