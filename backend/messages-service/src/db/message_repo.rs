use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Message;

const MESSAGE_COLUMNS: &str = "id, subject, body, sender, recipient, parent_id, sent_at, \
     read_at, replied_at, sender_deleted_at, recipient_deleted_at";

/// Data access layer for the messages table. Folders are predicates over
/// role and deletion timestamps, never stored state.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Messages received by the user and not deleted on the recipient side.
    pub async fn inbox_for(&self, user: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE recipient = $1 AND recipient_deleted_at IS NULL
            ORDER BY sent_at DESC
            "#,
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Messages sent by the user and not deleted on the sender side.
    pub async fn outbox_for(&self, user: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE sender = $1 AND sender_deleted_at IS NULL
            ORDER BY sent_at DESC
            "#,
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Messages the user deleted on either of their sides. A single OR
    /// query, so a message appears once even when the user is both parties.
    pub async fn trash_for(&self, user: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (recipient = $1 AND recipient_deleted_at IS NOT NULL)
               OR (sender = $1 AND sender_deleted_at IS NOT NULL)
            ORDER BY sent_at DESC
            "#,
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(message)
    }

    /// Insert a message inside an open transaction. `sent_at` is supplied by
    /// the caller so that one compose call stamps all its rows with the same
    /// instant; it is never written again.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        sender: Uuid,
        recipient: Uuid,
        subject: &str,
        body: &str,
        parent_id: Option<Uuid>,
        sent_at: DateTime<Utc>,
    ) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (id, subject, body, sender, recipient, parent_id, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(subject)
        .bind(body)
        .bind(sender)
        .bind(recipient)
        .bind(parent_id)
        .bind(sent_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(message)
    }

    /// Stamp the parent's replied_at inside the same transaction that
    /// inserts the reply row.
    pub async fn stamp_replied_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        parent_id: Uuid,
        replied_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE messages SET replied_at = $1 WHERE id = $2")
            .bind(replied_at)
            .bind(parent_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Persist a first read. read_at is written at most once per message.
    pub async fn update_read_at(
        &self,
        id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE messages SET read_at = $1 WHERE id = $2 AND read_at IS NULL")
            .bind(read_at)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Persist both deletion timestamps from the entity. Delete and
    /// undelete both funnel through here.
    pub async fn update_deletion(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE messages SET sender_deleted_at = $1, recipient_deleted_at = $2 WHERE id = $3",
        )
        .bind(message.sender_deleted_at)
        .bind(message.recipient_deleted_at)
        .bind(message.id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
