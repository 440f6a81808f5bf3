//! Free-text input routing.
//!
//! # Responsibility
//! - Classify one input and create the matching entity in its store.
//!
//! # Invariants
//! - At most one entity is created per call.
//! - Unknown input is a successful `Unclassified` result with no write.
//! - Store errors are returned unchanged.

use crate::classifier::{classify, fields, ClassificationResult, InputType, IntentKind};
use crate::context::RequestContext;
use crate::model::content::{ContentId, Feedback, NewFeedback};
use crate::model::memo::{Memo, NewMemo};
use crate::model::message::{NewMessage, Priority, WeChatMessage};
use crate::repo::content_repo::{ContentRepository, FeedbackRepository};
use crate::repo::memo_repo::MemoRepository;
use crate::repo::message_repo::MessageRepository;
use crate::service::{ContentService, MemoService, MessageService, ServiceError, ServiceResult};
use chrono::DateTime;
use log::{info, warn};
use serde::Serialize;

/// Outcome of routing one input, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutedResult {
    Memo { confidence: f64, memo: Memo },
    Message { confidence: f64, message: WeChatMessage },
    Feedback { confidence: f64, feedback: Feedback },
    Unclassified { confidence: f64, original_text: String },
}

impl RoutedResult {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Memo { .. } => IntentKind::Memo,
            Self::Message { .. } => IntentKind::Message,
            Self::Feedback { .. } => IntentKind::Feedback,
            Self::Unclassified { .. } => IntentKind::Unknown,
        }
    }
}

/// Dispatches classified input to the memo, message and content services.
pub struct InputRouter<'s, M, W, C, F>
where
    M: MemoRepository,
    W: MessageRepository,
    C: ContentRepository,
    F: FeedbackRepository,
{
    memos: &'s MemoService<M>,
    messages: &'s MessageService<W>,
    contents: &'s ContentService<C, F>,
}

impl<'s, M, W, C, F> InputRouter<'s, M, W, C, F>
where
    M: MemoRepository,
    W: MessageRepository,
    C: ContentRepository,
    F: FeedbackRepository,
{
    pub fn new(
        memos: &'s MemoService<M>,
        messages: &'s MessageService<W>,
        contents: &'s ContentService<C, F>,
    ) -> Self {
        Self {
            memos,
            messages,
            contents,
        }
    }

    /// Classifies `text` and stores the result.
    ///
    /// `input_type` is the raw client hint; unrecognized values are treated
    /// as no hint.
    pub fn route(
        &self,
        ctx: &RequestContext,
        text: &str,
        input_type: Option<&str>,
    ) -> ServiceResult<RoutedResult> {
        let hint = input_type.and_then(InputType::parse);
        let classification = classify(text, hint, ctx.now)?;
        let kind = classification.kind;
        let confidence = classification.confidence;

        let outcome = self.dispatch(classification);
        match &outcome {
            Ok(_) => info!(
                "event=input_route module=router status=ok request_id={} kind={:?} confidence={:.2}",
                ctx.request_id, kind, confidence
            ),
            Err(err) => warn!(
                "event=input_route module=router status=error request_id={} kind={:?} confidence={:.2} error_kind={}",
                ctx.request_id,
                kind,
                confidence,
                err.kind().as_str()
            ),
        }
        outcome
    }

    fn dispatch(&self, classification: ClassificationResult) -> ServiceResult<RoutedResult> {
        let confidence = classification.confidence;
        match classification.kind {
            IntentKind::Memo => {
                let memo = self.memos.create(&memo_from(&classification)?)?;
                Ok(RoutedResult::Memo { confidence, memo })
            }
            IntentKind::Message => {
                let message = self.messages.create(&message_from(&classification)?)?;
                Ok(RoutedResult::Message {
                    confidence,
                    message,
                })
            }
            IntentKind::Feedback => {
                let feedback = feedback_from(&classification)?;
                self.contents.get(feedback.content_id)?;
                let feedback = self.contents.submit_feedback(&feedback)?;
                Ok(RoutedResult::Feedback {
                    confidence,
                    feedback,
                })
            }
            IntentKind::Unknown => Ok(RoutedResult::Unclassified {
                confidence: 0.0,
                original_text: classification.original_text,
            }),
        }
    }
}

fn memo_from(classification: &ClassificationResult) -> ServiceResult<NewMemo> {
    let text = classification
        .field(fields::TEXT)
        .unwrap_or(&classification.original_text);
    let due_at = classification
        .field(fields::DUE_AT)
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|due_at| due_at.timestamp_millis())
                .map_err(|err| ServiceError::invalid_input(format!("bad due_at `{value}`: {err}")))
        })
        .transpose()?;
    Ok(NewMemo::new(text).with_due_at(due_at))
}

fn message_from(classification: &ClassificationResult) -> ServiceResult<NewMessage> {
    let priority = classification
        .field(fields::PRIORITY)
        .map(|value| {
            value
                .parse::<Priority>()
                .map_err(|err| ServiceError::invalid_input(err.to_string()))
        })
        .transpose()?;
    Ok(NewMessage {
        sender: classification
            .field(fields::SENDER)
            .unwrap_or_default()
            .to_string(),
        content: classification
            .field(fields::CONTENT)
            .unwrap_or(&classification.original_text)
            .to_string(),
        priority,
    })
}

fn feedback_from(classification: &ClassificationResult) -> ServiceResult<NewFeedback> {
    let content_id = classification
        .field(fields::CONTENT_ID)
        .ok_or_else(|| ServiceError::invalid_input("feedback does not reference a content item"))?
        .parse::<ContentId>()
        .map_err(|_| ServiceError::invalid_input("content reference is not a valid id"))?;
    let score = match classification.field(fields::SCORE) {
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| ServiceError::invalid_input(format!("bad score `{value}`")))?,
        None => 3,
    };
    Ok(NewFeedback {
        content_id,
        score,
        comment: classification.field(fields::COMMENT).map(str::to_string),
    })
}
