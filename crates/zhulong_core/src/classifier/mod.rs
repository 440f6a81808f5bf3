//! Free-text intent classification.
//!
//! # Responsibility
//! - Map raw text plus an optional input-type hint to one intent kind.
//! - Extract the fields the matching store needs.
//!
//! # Invariants
//! - `classify` is pure: same text, hint and reference time give the same
//!   result.
//! - Blank text is the only failure; anything else classifies, worst case to
//!   `IntentKind::Unknown` with confidence 0.0.
//! - A kind hint short-circuits to confidence 1.0 but extraction still runs.
//! - Without a hint, cues are checked in order: due date, message, content
//!   reference, memo keyword.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cues;
pub mod due_date;

pub use cues::classify_priority;
pub use due_date::{find_due_date, DueDate};

/// Keys used in [`ClassificationResult::extracted`].
pub mod fields {
    pub const TEXT: &str = "text";
    pub const DUE_AT: &str = "due_at";
    pub const SENDER: &str = "sender";
    pub const CONTENT: &str = "content";
    pub const PRIORITY: &str = "priority";
    pub const CONTENT_ID: &str = "content_id";
    pub const SCORE: &str = "score";
    pub const COMMENT: &str = "comment";
}

const CONFIDENCE_HINTED: f64 = 1.0;
const CONFIDENCE_DUE_DATE: f64 = 0.9;
const CONFIDENCE_MEMO_KEYWORD: f64 = 0.6;
const CONFIDENCE_SENDER: f64 = 0.8;
const CONFIDENCE_CHANNEL: f64 = 0.7;
const CONFIDENCE_URGENCY: f64 = 0.6;
const CONFIDENCE_FEEDBACK_SCORED: f64 = 0.85;
const CONFIDENCE_FEEDBACK: f64 = 0.7;

/// Declared input channel or kind, as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Typed text; carries no kind.
    Text,
    /// Speech-to-text; carries no kind.
    Voice,
    Memo,
    Message,
    Feedback,
}

impl InputType {
    /// Parses a client hint. Unrecognized values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "voice" => Some(Self::Voice),
            "memo" => Some(Self::Memo),
            "message" | "wechat" | "wechat_message" => Some(Self::Message),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }

    /// Intent kind forced by this hint, if any.
    pub fn intent(self) -> Option<IntentKind> {
        match self {
            Self::Text | Self::Voice => None,
            Self::Memo => Some(IntentKind::Memo),
            Self::Message => Some(IntentKind::Message),
            Self::Feedback => Some(IntentKind::Feedback),
        }
    }
}

/// Classified intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Memo,
    Message,
    Feedback,
    Unknown,
}

/// Transient classification output. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub kind: IntentKind,
    /// 0.0 to 1.0.
    pub confidence: f64,
    /// Field name to extracted value; see [`fields`].
    pub extracted: BTreeMap<String, String>,
    pub original_text: String,
}

impl ClassificationResult {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.extracted.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Text is empty after trimming.
    EmptyInput,
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input text must not be blank"),
        }
    }
}

impl Error for ClassifyError {}

/// Classifies `text`, resolving relative dates against `now`.
pub fn classify(
    text: &str,
    hint: Option<InputType>,
    now: DateTime<FixedOffset>,
) -> Result<ClassificationResult, ClassifyError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClassifyError::EmptyInput);
    }

    let due = find_due_date(trimmed, now);
    let (kind, confidence) = match hint.and_then(InputType::intent) {
        Some(kind) => (kind, CONFIDENCE_HINTED),
        None => detect_kind(trimmed, due),
    };

    let extracted = match kind {
        IntentKind::Memo => extract_memo(trimmed, due),
        IntentKind::Message => extract_message(trimmed),
        IntentKind::Feedback => extract_feedback(trimmed),
        IntentKind::Unknown => BTreeMap::new(),
    };

    Ok(ClassificationResult {
        kind,
        confidence,
        extracted,
        original_text: text.to_string(),
    })
}

fn detect_kind(text: &str, due: DueDate) -> (IntentKind, f64) {
    if due.is_present() {
        return (IntentKind::Memo, CONFIDENCE_DUE_DATE);
    }
    if cues::find_sender(text).is_some() {
        return (IntentKind::Message, CONFIDENCE_SENDER);
    }
    if cues::has_channel_cue(text) {
        return (IntentKind::Message, CONFIDENCE_CHANNEL);
    }
    if cues::has_urgency_cue(text) {
        return (IntentKind::Message, CONFIDENCE_URGENCY);
    }
    if cues::find_content_reference(text).is_some() {
        let confidence = if cues::find_explicit_score(text).is_some() {
            CONFIDENCE_FEEDBACK_SCORED
        } else {
            CONFIDENCE_FEEDBACK
        };
        return (IntentKind::Feedback, confidence);
    }
    if cues::has_memo_keyword(text) {
        return (IntentKind::Memo, CONFIDENCE_MEMO_KEYWORD);
    }
    (IntentKind::Unknown, 0.0)
}

fn extract_memo(text: &str, due: DueDate) -> BTreeMap<String, String> {
    let mut extracted = BTreeMap::new();
    extracted.insert(fields::TEXT.to_string(), text.to_string());
    if let Some(due_at) = due.resolved() {
        extracted.insert(fields::DUE_AT.to_string(), due_at.to_rfc3339());
    }
    extracted
}

fn extract_message(text: &str) -> BTreeMap<String, String> {
    let (sender, content) = match cues::find_sender(text) {
        Some(cue) => (cue.sender, cue.content),
        None => (String::new(), text.to_string()),
    };
    let priority = classify_priority(&content, &sender);

    let mut extracted = BTreeMap::new();
    if !sender.is_empty() {
        extracted.insert(fields::SENDER.to_string(), sender);
    }
    extracted.insert(fields::CONTENT.to_string(), content);
    extracted.insert(fields::PRIORITY.to_string(), priority.as_str().to_string());
    extracted
}

fn extract_feedback(text: &str) -> BTreeMap<String, String> {
    let mut extracted = BTreeMap::new();
    if let Some(content_id) = cues::find_content_reference(text) {
        extracted.insert(fields::CONTENT_ID.to_string(), content_id.to_string());
    }
    let score = cues::find_explicit_score(text).unwrap_or_else(|| cues::infer_score(text));
    extracted.insert(fields::SCORE.to_string(), score.to_string());
    extracted.insert(fields::COMMENT.to_string(), text.to_string());
    extracted
}
