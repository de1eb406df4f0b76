use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named view over messages, derived from role and deletion-timestamp
/// predicates. Not a stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Inbox,
    Outbox,
    Trash,
}

/// A private message from user to user.
///
/// `sender` and `recipient` go null when the referenced account is removed;
/// the message itself is retained. Each party soft-deletes independently via
/// its own `*_deleted_at` timestamp, and a message only leaves the database
/// once an external retention job prunes rows where both are set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub sender: Option<Uuid>,
    pub recipient: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
    pub sender_deleted_at: Option<DateTime<Utc>>,
    pub recipient_deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether the recipient has not read the message yet.
    pub fn is_new(&self) -> bool {
        self.read_at.is_none()
    }

    /// Whether a reply has been recorded against this message.
    pub fn is_replied(&self) -> bool {
        self.replied_at.is_some()
    }

    pub fn is_sender(&self, user: Uuid) -> bool {
        self.sender == Some(user)
    }

    pub fn is_recipient(&self, user: Uuid) -> bool {
        self.recipient == Some(user)
    }

    /// Whether the user holds any role on this message. A user may be both
    /// sender and recipient.
    pub fn is_party(&self, user: Uuid) -> bool {
        self.is_sender(user) || self.is_recipient(user)
    }

    /// The other side of the conversation relative to `user`. `None` when
    /// the user holds no role, or when the counter-party account has been
    /// removed.
    pub fn counter_party_of(&self, user: Uuid) -> Option<Uuid> {
        if self.is_sender(user) {
            self.recipient
        } else if self.is_recipient(user) {
            self.sender
        } else {
            None
        }
    }

    /// Soft-delete every side the user owns. Returns false when the user
    /// holds no role (the caller maps that to not-found). Re-deleting an
    /// already-deleted side refreshes the timestamp; visibility is
    /// unchanged.
    pub fn delete_for(&mut self, user: Uuid, now: DateTime<Utc>) -> bool {
        let mut deleted = false;
        if self.is_sender(user) {
            self.sender_deleted_at = Some(now);
            deleted = true;
        }
        if self.is_recipient(user) {
            self.recipient_deleted_at = Some(now);
            deleted = true;
        }
        deleted
    }

    /// Recover every side the user owns from trash. Returns false when the
    /// user holds no role.
    pub fn undelete_for(&mut self, user: Uuid) -> bool {
        let mut undeleted = false;
        if self.is_sender(user) {
            self.sender_deleted_at = None;
            undeleted = true;
        }
        if self.is_recipient(user) {
            self.recipient_deleted_at = None;
            undeleted = true;
        }
        undeleted
    }

    /// Record the first read by the recipient. Only the recipient role
    /// transitions unread -> read, only once, and it never reverts.
    pub fn mark_read_by(&mut self, user: Uuid, now: DateTime<Utc>) -> bool {
        if self.is_recipient(user) && self.read_at.is_none() {
            self.read_at = Some(now);
            return true;
        }
        false
    }

    /// Whether the user's own side of this message is currently in trash.
    pub fn trashed_for(&self, user: Uuid) -> bool {
        (self.is_recipient(user) && self.recipient_deleted_at.is_some())
            || (self.is_sender(user) && self.sender_deleted_at.is_some())
    }

    /// Folder membership predicate. Mirrors the repository queries so the
    /// visibility state machine is testable without a database.
    pub fn visible_in(&self, folder: Folder, user: Uuid) -> bool {
        match folder {
            Folder::Inbox => self.is_recipient(user) && self.recipient_deleted_at.is_none(),
            Folder::Outbox => self.is_sender(user) && self.sender_deleted_at.is_none(),
            Folder::Trash => self.trashed_for(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_between(sender: Uuid, recipient: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            subject: "Hi".into(),
            body: "hello".into(),
            sender: Some(sender),
            recipient: Some(recipient),
            parent_id: None,
            sent_at: Utc::now(),
            read_at: None,
            replied_at: None,
            sender_deleted_at: None,
            recipient_deleted_at: None,
        }
    }

    #[test]
    fn fresh_message_is_in_outbox_and_inbox_only() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message_between(a, b);

        assert!(msg.visible_in(Folder::Outbox, a));
        assert!(msg.visible_in(Folder::Inbox, b));
        assert!(!msg.visible_in(Folder::Trash, a));
        assert!(!msg.visible_in(Folder::Trash, b));
        assert!(msg.is_new());
        assert!(!msg.is_replied());
    }

    #[test]
    fn sender_delete_moves_outbox_to_trash_and_leaves_inbox_alone() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        assert!(msg.delete_for(a, Utc::now()));
        assert!(!msg.visible_in(Folder::Outbox, a));
        assert!(msg.visible_in(Folder::Trash, a));
        assert!(msg.visible_in(Folder::Inbox, b));
        assert!(!msg.visible_in(Folder::Trash, b));
    }

    #[test]
    fn both_sides_deleted_means_trash_for_both() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        msg.delete_for(a, Utc::now());
        msg.delete_for(b, Utc::now());
        assert!(!msg.visible_in(Folder::Outbox, a));
        assert!(!msg.visible_in(Folder::Inbox, b));
        assert!(msg.visible_in(Folder::Trash, a));
        assert!(msg.visible_in(Folder::Trash, b));
    }

    #[test]
    fn delete_then_undelete_restores_visibility() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        msg.delete_for(b, Utc::now());
        assert!(!msg.visible_in(Folder::Inbox, b));
        assert!(msg.undelete_for(b));
        assert!(msg.visible_in(Folder::Inbox, b));
        assert!(!msg.visible_in(Folder::Trash, b));
    }

    #[test]
    fn delete_by_stranger_is_refused() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        assert!(!msg.delete_for(Uuid::new_v4(), Utc::now()));
        assert!(!msg.undelete_for(Uuid::new_v4()));
        assert!(msg.sender_deleted_at.is_none());
        assert!(msg.recipient_deleted_at.is_none());
    }

    #[test]
    fn self_message_deletes_both_sides_and_appears_once_in_trash() {
        let a = Uuid::new_v4();
        let mut msg = message_between(a, a);

        assert!(msg.delete_for(a, Utc::now()));
        assert!(msg.sender_deleted_at.is_some());
        assert!(msg.recipient_deleted_at.is_some());
        assert!(msg.visible_in(Folder::Trash, a));
    }

    #[test]
    fn only_recipient_marks_read_and_only_once() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        assert!(!msg.mark_read_by(a, Utc::now()));
        assert!(msg.read_at.is_none());

        assert!(msg.mark_read_by(b, Utc::now()));
        let first_read = msg.read_at;
        assert!(first_read.is_some());

        // Second view does not move the timestamp.
        assert!(!msg.mark_read_by(b, Utc::now()));
        assert_eq!(msg.read_at, first_read);
        assert!(!msg.is_new());
    }

    #[test]
    fn counter_party_is_the_other_side() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message_between(a, b);

        assert_eq!(msg.counter_party_of(a), Some(b));
        assert_eq!(msg.counter_party_of(b), Some(a));
        assert_eq!(msg.counter_party_of(Uuid::new_v4()), None);
    }

    #[test]
    fn counter_party_is_none_when_account_removed() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);
        msg.sender = None;

        assert_eq!(msg.counter_party_of(b), None);
    }

    #[test]
    fn trashed_for_tracks_own_side_only() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut msg = message_between(a, b);

        msg.delete_for(a, Utc::now());
        assert!(msg.trashed_for(a));
        assert!(!msg.trashed_for(b));
    }
}
