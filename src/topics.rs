//! Topic extraction from transcripts.
//!
//! The text-generation service is asked for a JSON array of ranked topics,
//! but its reply is free-form text: the array may be wrapped in commentary or
//! code fences, and may use Python-literal syntax instead of strict JSON.
//! Decoding is two-tier (strict, then permissive) and degrades to an empty
//! list when both tiers fail. Parse failures never escape this module.

use crate::error::Result;
use crate::llm::TextGenerator;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Soft output cap for topic replies, in tokens.
const TOPICS_MAX_TOKENS: u32 = 300;

/// Decoded topic list. Entries stay raw JSON values: whatever shape the
/// service asserted flows through to the analytics record unchanged, missing
/// fields included.
pub type TopicList = Vec<Value>;

/// Outcome of decoding the service reply.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicsOutcome {
    /// An array literal was found and one of the parse tiers accepted it.
    Parsed(TopicList),
    /// No array literal, or neither parse tier accepted it.
    Empty,
}

impl TopicsOutcome {
    /// Unwrap into a list, empty on `Empty`.
    pub fn into_list(self) -> TopicList {
        match self {
            TopicsOutcome::Parsed(list) => list,
            TopicsOutcome::Empty => Vec::new(),
        }
    }
}

/// Extracts ranked topics from a transcript via the text-generation service.
pub struct TopicExtractor {
    generator: Arc<dyn TextGenerator>,
    top_n: usize,
    max_tokens: u32,
}

impl TopicExtractor {
    /// Create a new extractor over the given generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            top_n: 3,
            max_tokens: TOPICS_MAX_TOKENS,
        }
    }

    /// Set the minimum number of topics requested from the service.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Override the advisory output cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the topic extraction prompt.
    fn build_prompt(&self, transcript: &str) -> String {
        format!(
            "Given the following transcript, identify the most frequently mentioned topics or themes. \
             Return a JSON array of objects, each with 'topic' and 'mentions' fields, sorted by mentions descending. \
             Return at least {} topics.\nTranscript:\n{}",
            self.top_n, transcript
        )
    }

    /// Ask the service for topics and decode its reply.
    ///
    /// A service failure is an error; a malformed reply is not.
    pub async fn extract(&self, transcript: &str) -> Result<TopicsOutcome> {
        debug!(
            "Extracting at least {} topics with {}",
            self.top_n,
            self.generator.name()
        );

        let prompt = self.build_prompt(transcript);
        let reply = self.generator.generate(&prompt, self.max_tokens).await?;

        Ok(decode_topics(&reply))
    }
}

/// Decode a free-form service reply into a topic list.
///
/// Locates the first array-looking span, tries strict JSON, then a permissive
/// Python-literal pass, then gives up with `Empty`.
pub fn decode_topics(reply: &str) -> TopicsOutcome {
    let Some(span) = find_array_span(reply) else {
        warn!("No array literal in topics reply");
        return TopicsOutcome::Empty;
    };

    match serde_json::from_str::<TopicList>(span) {
        Ok(list) => TopicsOutcome::Parsed(list),
        Err(strict_err) => {
            debug!("Strict topic parse failed ({strict_err}), trying permissive pass");
            let relaxed = relax_literal(span);
            match serde_json::from_str::<TopicList>(&relaxed) {
                Ok(list) => TopicsOutcome::Parsed(list),
                Err(err) => {
                    warn!("Permissive topic parse failed: {err}");
                    TopicsOutcome::Empty
                }
            }
        }
    }
}

/// First array-looking span in the reply: first `[` through last `]`,
/// newlines included, so a whole array survives surrounding commentary.
fn find_array_span(reply: &str) -> Option<&str> {
    let array_re = Regex::new(r"(?s)\[.*\]").expect("Invalid regex");
    array_re.find(reply).map(|m| m.as_str())
}

/// Rewrite a Python-literal-style array into strict JSON.
///
/// Handles the usual model slips: single-quoted strings, bare identifier
/// keys, trailing commas, and `True`/`False`/`None`. Anything it cannot make
/// sense of is left for the JSON parser to reject.
fn relax_literal(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut chars = span.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            // String in either quote style: emit double-quoted JSON.
            '\'' | '"' => {
                let quote = ch;
                out.push('"');
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        // \' has no meaning in JSON; unescape it.
                        if c == '\'' {
                            out.push('\'');
                        } else {
                            out.push('\\');
                            out.push(c);
                        }
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        break;
                    } else if c == '"' {
                        out.push_str("\\\"");
                    } else {
                        out.push(c);
                    }
                }
                out.push('"');
            }
            // Comma directly before a closing bracket is dropped.
            ',' => {
                let mut lookahead = chars.clone();
                let mut closes = false;
                while let Some(c) = lookahead.next() {
                    if c.is_whitespace() {
                        continue;
                    }
                    closes = c == ']' || c == '}';
                    break;
                }
                if !closes {
                    out.push(',');
                }
            }
            // Bare word: Python constant or an unquoted key.
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::new();
                word.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }

                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    "true" | "false" | "null" => out.push_str(&word),
                    _ => {
                        let mut lookahead = chars.clone();
                        let mut is_key = false;
                        while let Some(c) = lookahead.next() {
                            if c.is_whitespace() {
                                continue;
                            }
                            is_key = c == ':';
                            break;
                        }
                        if is_key {
                            out.push('"');
                            out.push_str(&word);
                            out.push('"');
                        } else {
                            out.push_str(&word);
                        }
                    }
                }
            }
            c => out.push(c),
        }
    }

    out
}
