//! Content ingestion, ranking and feedback service.
//!
//! # Responsibility
//! - Score new contents against interest keywords and learned weights.
//! - Record feedback and feed positive scores back into keyword weights.
//!
//! # Invariants
//! - Feedback always references an existing content item.
//! - Relevance is computed once at ingest time and stored.

use crate::model::content::{Content, ContentId, Feedback, FeedbackId, NewContent, NewFeedback};
use crate::model::EntityKind;
use crate::ranking::{relevance_score, RankingSettings};
use crate::repo::content_repo::{
    ContentListQuery, ContentRepository, FeedbackListQuery, FeedbackRepository,
};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Content service facade over content and feedback repositories.
pub struct ContentService<C: ContentRepository, F: FeedbackRepository> {
    contents: C,
    feedback: F,
    ranking: RankingSettings,
}

impl<C: ContentRepository, F: FeedbackRepository> ContentService<C, F> {
    pub fn new(contents: C, feedback: F, ranking: RankingSettings) -> Self {
        Self {
            contents,
            feedback,
            ranking,
        }
    }

    pub fn ranking(&self) -> &RankingSettings {
        &self.ranking
    }

    /// Stores a content item with its relevance computed from the current
    /// keyword weights.
    pub fn ingest(&self, content: &NewContent) -> ServiceResult<Content> {
        content.validate()?;
        let weights = self.contents.keyword_weights()?;
        let score = relevance_score(
            &content.title,
            &content.body,
            &self.ranking.interest_keywords,
            &weights,
        );
        let created = self.contents.create_content(content, score)?;
        info!(
            "event=content_ingest module=service status=ok content_id={} relevance={:.2}",
            created.id, created.relevance_score
        );
        Ok(created)
    }

    pub fn get(&self, id: ContentId) -> ServiceResult<Content> {
        self.contents
            .get_content(id)?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Content,
                id,
            })
    }

    pub fn list(&self, query: &ContentListQuery) -> ServiceResult<Vec<Content>> {
        Ok(self.contents.list_contents(query)?)
    }

    /// Deletes a content item together with its feedback.
    pub fn delete(&self, id: ContentId) -> ServiceResult<()> {
        self.contents.delete_content(id)?;
        info!("event=content_delete module=service status=ok content_id={id}");
        Ok(())
    }

    /// Records feedback on an existing content item.
    pub fn submit_feedback(&self, feedback: &NewFeedback) -> ServiceResult<Feedback> {
        feedback.validate()?;
        let created = self
            .feedback
            .create_feedback(feedback, &self.ranking.interest_keywords)?;
        info!(
            "event=feedback_submit module=service status=ok feedback_id={} content_id={} score={}",
            created.id, created.content_id, created.score
        );
        Ok(created)
    }

    pub fn get_feedback(&self, id: FeedbackId) -> ServiceResult<Feedback> {
        self.feedback
            .get_feedback(id)?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Feedback,
                id,
            })
    }

    /// Feedback for one content item, newest first.
    pub fn list_feedback(
        &self,
        content_id: ContentId,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Feedback>> {
        self.get(content_id)?;
        Ok(self.feedback.list_feedback(&FeedbackListQuery {
            content_id: Some(content_id),
            limit,
        })?)
    }
}
