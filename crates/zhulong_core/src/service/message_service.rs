//! WeChat message use-case service.

use crate::classifier::classify_priority;
use crate::model::message::{MessageId, NewMessage, WeChatMessage};
use crate::model::EntityKind;
use crate::repo::message_repo::{MessageListQuery, MessageRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Message service facade over repository implementations.
pub struct MessageService<R: MessageRepository> {
    repo: R,
}

impl<R: MessageRepository> MessageService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a message. Without an explicit priority one is derived from
    /// the sender and content keywords.
    pub fn create(&self, message: &NewMessage) -> ServiceResult<WeChatMessage> {
        message.validate()?;
        let priority = message
            .priority
            .unwrap_or_else(|| classify_priority(&message.content, &message.sender));
        let created = self.repo.create_message(message, priority)?;
        info!(
            "event=message_create module=service status=ok message_id={} priority={}",
            created.id, created.priority
        );
        Ok(created)
    }

    pub fn get(&self, id: MessageId) -> ServiceResult<WeChatMessage> {
        self.repo.get_message(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Message,
            id,
        })
    }

    pub fn list(&self, query: &MessageListQuery) -> ServiceResult<Vec<WeChatMessage>> {
        Ok(self.repo.list_messages(query)?)
    }

    pub fn mark_read(&self, id: MessageId) -> ServiceResult<()> {
        self.repo.mark_read(id)?;
        info!("event=message_read module=service status=ok message_id={id}");
        Ok(())
    }

    pub fn delete(&self, id: MessageId) -> ServiceResult<()> {
        self.repo.delete_message(id)?;
        info!("event=message_delete module=service status=ok message_id={id}");
        Ok(())
    }
}
