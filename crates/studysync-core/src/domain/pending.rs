//! Pending-operation queue entries
//!
//! A [`PendingOperation`] records a mutation performed while disconnected
//! that must be replayed against the network. The queue is strictly FIFO:
//! ids are assigned by the store in monotonically increasing order and
//! entries are removed only after the backend confirms success.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::document::{Collection, DocumentKey};
use super::errors::DomainError;

// ============================================================================
// Sync actions
// ============================================================================

/// Named background-sync registration tags
///
/// Two tags exist, one per mutation family, matching what is registered
/// with the platform's background task scheduler when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTag {
    /// Question/content/quiz/favorite uploads
    ContentUpload,
    /// Quiz attempt submissions
    QuizAttempt,
}

impl SyncTag {
    /// The tag name registered with the platform scheduler
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SyncTag::ContentUpload => "content-upload",
            SyncTag::QuizAttempt => "quiz-attempt",
        }
    }

    /// Both tags, for registration at startup / reconnect
    pub const ALL: [SyncTag; 2] = [SyncTag::ContentUpload, SyncTag::QuizAttempt];
}

impl Display for SyncTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The kind of mutation a pending operation replays
///
/// Serialized as a dotted string (`"questions.create"`, `"file.upload"`)
/// so queue rows remain readable and stable across schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SyncAction {
    /// Insert a document into a backend collection
    Create(Collection),
    /// Update an existing document in a backend collection
    Update(Collection),
    /// Delete a document from a backend collection
    Delete(Collection),
    /// Upload a file to backend storage
    UploadFile,
    /// Delete a file from backend storage
    DeleteFile,
}

impl SyncAction {
    /// The collection this action targets, if any
    #[must_use]
    pub fn collection(&self) -> Option<Collection> {
        match self {
            SyncAction::Create(c) | SyncAction::Update(c) | SyncAction::Delete(c) => Some(*c),
            SyncAction::UploadFile | SyncAction::DeleteFile => None,
        }
    }

    /// The background-sync tag this action falls under
    #[must_use]
    pub fn sync_tag(&self) -> SyncTag {
        match self.collection() {
            Some(Collection::QuizAttempts) => SyncTag::QuizAttempt,
            _ => SyncTag::ContentUpload,
        }
    }
}

impl Display for SyncAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create(c) => write!(f, "{}.create", c.name()),
            SyncAction::Update(c) => write!(f, "{}.update", c.name()),
            SyncAction::Delete(c) => write!(f, "{}.delete", c.name()),
            SyncAction::UploadFile => write!(f, "file.upload"),
            SyncAction::DeleteFile => write!(f, "file.delete"),
        }
    }
}

impl FromStr for SyncAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file.upload" => return Ok(SyncAction::UploadFile),
            "file.delete" => return Ok(SyncAction::DeleteFile),
            _ => {}
        }
        let (collection, verb) = s
            .rsplit_once('.')
            .ok_or_else(|| DomainError::InvalidAction(s.to_string()))?;
        let collection = Collection::from_name(collection)
            .map_err(|_| DomainError::InvalidAction(s.to_string()))?;
        match verb {
            "create" => Ok(SyncAction::Create(collection)),
            "update" => Ok(SyncAction::Update(collection)),
            "delete" => Ok(SyncAction::Delete(collection)),
            _ => Err(DomainError::InvalidAction(s.to_string())),
        }
    }
}

impl TryFrom<String> for SyncAction {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SyncAction> for String {
    fn from(action: SyncAction) -> Self {
        action.to_string()
    }
}

// ============================================================================
// PendingOperation
// ============================================================================

/// One queued mutation awaiting replay against the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Store-assigned, monotonically increasing queue id
    pub id: i64,
    /// What to replay
    pub action: SyncAction,
    /// The request body the backend expects, verbatim
    pub payload: serde_json::Value,
    /// When the mutation was queued
    pub enqueued_at: DateTime<Utc>,
}

impl PendingOperation {
    /// The local document this operation concerns, if it can be derived
    ///
    /// Used by the reconciler to flip `sync_pending` off after a confirmed
    /// success. Collection actions carry the document id (or the favorites
    /// pair) inside the payload; file operations have no document.
    #[must_use]
    pub fn document_ref(&self) -> Option<(Collection, DocumentKey)> {
        let collection = self.action.collection()?;
        if collection.has_composite_key() {
            let user = self.payload.get("user_id")?.as_str()?.parse().ok()?;
            let question = self.payload.get("question_id")?.as_str()?.parse().ok()?;
            Some((collection, DocumentKey::favorite(user, question)))
        } else {
            let id = self.payload.get("id")?.as_str()?.parse().ok()?;
            Some((collection, DocumentKey::Id(id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::newtypes::{DocumentId, UserId};
    use serde_json::json;

    #[test]
    fn test_action_string_roundtrip() {
        let actions = [
            SyncAction::Create(Collection::Questions),
            SyncAction::Update(Collection::Quizzes),
            SyncAction::Delete(Collection::Favorites),
            SyncAction::UploadFile,
            SyncAction::DeleteFile,
        ];
        for action in actions {
            let parsed: SyncAction = action.to_string().parse().unwrap();
            assert_eq!(action, parsed);
        }
    }

    #[test]
    fn test_action_rejects_unknown_verb() {
        assert!("questions.upsert".parse::<SyncAction>().is_err());
        assert!("bogus".parse::<SyncAction>().is_err());
    }

    #[test]
    fn test_quiz_attempts_map_to_quiz_attempt_tag() {
        assert_eq!(
            SyncAction::Create(Collection::QuizAttempts).sync_tag(),
            SyncTag::QuizAttempt
        );
        assert_eq!(
            SyncAction::Create(Collection::Questions).sync_tag(),
            SyncTag::ContentUpload
        );
        assert_eq!(SyncAction::UploadFile.sync_tag(), SyncTag::ContentUpload);
    }

    #[test]
    fn test_document_ref_from_payload_id() {
        let id = DocumentId::new();
        let op = PendingOperation {
            id: 1,
            action: SyncAction::Create(Collection::Questions),
            payload: json!({"id": id.to_string(), "text": "?"}),
            enqueued_at: Utc::now(),
        };
        let (collection, key) = op.document_ref().unwrap();
        assert_eq!(collection, Collection::Questions);
        assert_eq!(key, DocumentKey::Id(id));
    }

    #[test]
    fn test_document_ref_for_favorites_pair() {
        let user = UserId::new();
        let question = DocumentId::new();
        let op = PendingOperation {
            id: 2,
            action: SyncAction::Create(Collection::Favorites),
            payload: json!({
                "user_id": user.to_string(),
                "question_id": question.to_string(),
            }),
            enqueued_at: Utc::now(),
        };
        let (collection, key) = op.document_ref().unwrap();
        assert_eq!(collection, Collection::Favorites);
        assert_eq!(key, DocumentKey::favorite(user, question));
    }

    #[test]
    fn test_document_ref_absent_for_file_ops() {
        let op = PendingOperation {
            id: 3,
            action: SyncAction::UploadFile,
            payload: json!({"path": "uploads/photo.png"}),
            enqueued_at: Utc::now(),
        };
        assert!(op.document_ref().is_none());
    }
}
