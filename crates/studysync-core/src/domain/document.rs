//! Locally mirrored domain documents
//!
//! A [`LocalDocument`] is a record mirrored from the remote backend so it
//! remains readable offline. The offline layer does not interpret document
//! bodies beyond the keys it needs; payloads are carried as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::errors::DomainError;
use super::newtypes::{DocumentId, UserId};

// ============================================================================
// Collections
// ============================================================================

/// The document collections mirrored for offline use
///
/// Names match the backend's table names so pending operations can be
/// replayed against the matching REST endpoint without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Questions,
    GeneratedContent,
    Quizzes,
    QuizQuestions,
    QuizAttempts,
    Favorites,
}

impl Collection {
    /// All collections, in schema order
    pub const ALL: [Collection; 6] = [
        Collection::Questions,
        Collection::GeneratedContent,
        Collection::Quizzes,
        Collection::QuizQuestions,
        Collection::QuizAttempts,
        Collection::Favorites,
    ];

    /// The backend table / partition name for this collection
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Questions => "questions",
            Collection::GeneratedContent => "generated_content",
            Collection::Quizzes => "quizzes",
            Collection::QuizQuestions => "quiz_questions",
            Collection::QuizAttempts => "quiz_attempts",
            Collection::Favorites => "favorites",
        }
    }

    /// Parse a collection from its partition name
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name {
            "questions" => Ok(Collection::Questions),
            "generated_content" => Ok(Collection::GeneratedContent),
            "quizzes" => Ok(Collection::Quizzes),
            "quiz_questions" => Ok(Collection::QuizQuestions),
            "quiz_attempts" => Ok(Collection::QuizAttempts),
            "favorites" => Ok(Collection::Favorites),
            other => Err(DomainError::InvalidCollection(other.to_string())),
        }
    }

    /// Whether keys in this collection are composite (user + question)
    #[must_use]
    pub fn has_composite_key(&self) -> bool {
        matches!(self, Collection::Favorites)
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Collection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// ============================================================================
// Document keys
// ============================================================================

/// Primary key of a local document
///
/// Most collections key by a single document id; favorites key by the
/// `(user, question)` pair. The canonical string form is the id, or
/// `"user/question"` for composites, and is what the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentKey {
    /// Single-field key
    Id(DocumentId),
    /// Composite favorites key
    UserQuestion {
        user: UserId,
        question: DocumentId,
    },
}

impl DocumentKey {
    /// Build a composite favorites key
    #[must_use]
    pub fn favorite(user: UserId, question: DocumentId) -> Self {
        Self::UserQuestion { user, question }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKey::Id(id) => write!(f, "{id}"),
            DocumentKey::UserQuestion { user, question } => write!(f, "{user}/{question}"),
        }
    }
}

impl FromStr for DocumentKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidKey(s.to_string());
        match s.split_once('/') {
            Some((user, question)) => Ok(DocumentKey::UserQuestion {
                user: user.parse().map_err(|_| invalid())?,
                question: question.parse().map_err(|_| invalid())?,
            }),
            None => Ok(DocumentKey::Id(s.parse().map_err(|_| invalid())?)),
        }
    }
}

impl From<DocumentId> for DocumentKey {
    fn from(id: DocumentId) -> Self {
        Self::Id(id)
    }
}

impl TryFrom<String> for DocumentKey {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DocumentKey> for String {
    fn from(key: DocumentKey) -> Self {
        key.to_string()
    }
}

// ============================================================================
// LocalDocument
// ============================================================================

/// A domain record mirrored from the remote backend for offline availability
///
/// Two flags track its relationship to the server: `offline` marks a record
/// created or modified while disconnected, and `sync_pending` marks one not
/// yet confirmed by the server. Both are cleared once the reconciler gets a
/// confirmed success for the matching pending operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDocument {
    collection: Collection,
    key: DocumentKey,
    owner: UserId,
    payload: serde_json::Value,
    offline: bool,
    sync_pending: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LocalDocument {
    /// Create a document mirrored from a server response (already in sync)
    #[must_use]
    pub fn mirrored(
        collection: Collection,
        key: DocumentKey,
        owner: UserId,
        payload: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            collection,
            key,
            owner,
            payload,
            offline: false,
            sync_pending: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a document authored while disconnected
    ///
    /// Both flags are set; the caller is expected to enqueue a matching
    /// pending operation so the reconciler can confirm it later.
    #[must_use]
    pub fn authored_offline(
        collection: Collection,
        key: DocumentKey,
        owner: UserId,
        payload: serde_json::Value,
    ) -> Self {
        let mut doc = Self::mirrored(collection, key, owner, payload);
        doc.offline = true;
        doc.sync_pending = true;
        doc
    }

    /// Reconstruct a document from persisted parts
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        collection: Collection,
        key: DocumentKey,
        owner: UserId,
        payload: serde_json::Value,
        offline: bool,
        sync_pending: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collection,
            key,
            owner,
            payload,
            offline,
            sync_pending,
            created_at,
            updated_at,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn is_sync_pending(&self) -> bool {
        self.sync_pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the payload, marking the document modified now
    pub fn update_payload(&mut self, payload: serde_json::Value) {
        self.payload = payload;
        self.updated_at = Utc::now();
    }

    /// Clear both offline flags after the server confirms the record
    pub fn confirm_synced(&mut self) {
        self.offline = false;
        self.sync_pending = false;
        self.updated_at = Utc::now();
    }
}
