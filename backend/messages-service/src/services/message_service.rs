use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::MessageRepository;
use crate::error::AppError;
use crate::models::{Folder, Message};
use crate::validators;

/// Orchestrates store access and enforces the access rule: every "does not
/// exist" and "not yours" case collapses into the same not-found outcome.
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create one message per recipient, all sharing the caller as sender
    /// and the same sent_at instant. The inserts run in one transaction, so
    /// a failure on the Nth recipient creates nothing.
    pub async fn compose(
        &self,
        caller: Uuid,
        recipients: &[Uuid],
        subject: &str,
        body: &str,
    ) -> Result<Vec<Message>, AppError> {
        validators::validate_recipients(recipients)?;
        validators::validate_subject(subject)?;
        validators::validate_body(body)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut messages = Vec::with_capacity(recipients.len());
        for &recipient in recipients {
            let message =
                MessageRepository::create_in_tx(&mut tx, caller, recipient, subject, body, None, now)
                    .await?;
            messages.push(message);
        }
        tx.commit().await?;

        tracing::info!(sender = %caller, count = messages.len(), "messages composed");
        Ok(messages)
    }

    /// Reply to a message the caller is a party of. The recipient is always
    /// the parent's counter-party; it is never taken from request input.
    /// The reply insert and the parent's replied_at stamp commit together.
    pub async fn reply(
        &self,
        caller: Uuid,
        parent_id: Uuid,
        subject: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        let repo = MessageRepository::new(&self.pool);
        let parent = repo
            .get(parent_id)
            .await?
            .ok_or_else(AppError::message_not_found)?;
        if !parent.is_party(caller) {
            return Err(AppError::message_not_found());
        }

        validators::validate_subject(subject)?;
        validators::validate_body(body)?;

        // The counter-party account may have been removed while the message
        // was retained; there is no one left to address the reply to.
        let recipient = parent
            .counter_party_of(caller)
            .ok_or_else(|| AppError::Validation("recipient no longer exists".into()))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let message = MessageRepository::create_in_tx(
            &mut tx,
            caller,
            recipient,
            subject,
            body,
            Some(parent.id),
            now,
        )
        .await?;
        MessageRepository::stamp_replied_in_tx(&mut tx, parent.id, now).await?;
        tx.commit().await?;

        Ok(message)
    }

    /// Soft-delete every side of the message the caller owns. Not-found when
    /// the message is absent or the caller holds no role on it.
    pub async fn delete(&self, caller: Uuid, message_id: Uuid) -> Result<(), AppError> {
        let repo = MessageRepository::new(&self.pool);
        let mut message = repo
            .get(message_id)
            .await?
            .ok_or_else(AppError::message_not_found)?;

        if !message.delete_for(caller, Utc::now()) {
            return Err(AppError::message_not_found());
        }
        repo.update_deletion(&message).await
    }

    /// Recover every side of the message the caller owns from trash.
    pub async fn undelete(&self, caller: Uuid, message_id: Uuid) -> Result<(), AppError> {
        let repo = MessageRepository::new(&self.pool);
        let mut message = repo
            .get(message_id)
            .await?
            .ok_or_else(AppError::message_not_found)?;

        if !message.undelete_for(caller) {
            return Err(AppError::message_not_found());
        }
        repo.update_deletion(&message).await
    }

    /// Show a single message. A party whose own side is in trash cannot view
    /// it here; trash listing is a separate concern. Viewing as the
    /// recipient records the first read.
    pub async fn view(&self, caller: Uuid, message_id: Uuid) -> Result<Message, AppError> {
        let repo = MessageRepository::new(&self.pool);
        let mut message = repo
            .get(message_id)
            .await?
            .ok_or_else(AppError::message_not_found)?;

        if !message.is_party(caller) || message.trashed_for(caller) {
            return Err(AppError::message_not_found());
        }

        if message.mark_read_by(caller, Utc::now()) {
            // read_at is set at most once; the guard in the UPDATE keeps a
            // concurrent first view from moving the timestamp.
            repo.update_read_at(message.id, message.read_at.unwrap_or_else(Utc::now))
                .await?;
        }

        Ok(message)
    }

    /// List one of the caller's folders, most recent first.
    pub async fn list(&self, caller: Uuid, folder: Folder) -> Result<Vec<Message>, AppError> {
        let repo = MessageRepository::new(&self.pool);
        match folder {
            Folder::Inbox => repo.inbox_for(caller).await,
            Folder::Outbox => repo.outbox_for(caller).await,
            Folder::Trash => repo.trash_for(caller).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // A pool that never connects: any query would fail, so reaching a
    // validation error proves the store was not touched.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/unreachable")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn compose_with_no_recipients_is_rejected_before_any_store_access() {
        let service = MessageService::new(lazy_pool());
        let err = service
            .compose(Uuid::new_v4(), &[], "Hi", "hello")
            .await
            .expect_err("empty recipient list must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn compose_with_blank_subject_is_rejected() {
        let service = MessageService::new(lazy_pool());
        let err = service
            .compose(Uuid::new_v4(), &[Uuid::new_v4()], "  ", "hello")
            .await
            .expect_err("blank subject must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn compose_with_oversized_subject_is_rejected() {
        let service = MessageService::new(lazy_pool());
        let subject = "x".repeat(crate::validators::SUBJECT_MAX_LEN + 1);
        let err = service
            .compose(Uuid::new_v4(), &[Uuid::new_v4()], &subject, "hello")
            .await
            .expect_err("oversized subject must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn compose_with_empty_body_is_rejected() {
        let service = MessageService::new(lazy_pool());
        let err = service
            .compose(Uuid::new_v4(), &[Uuid::new_v4()], "Hi", "")
            .await
            .expect_err("empty body must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
