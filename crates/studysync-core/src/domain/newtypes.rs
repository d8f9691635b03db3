//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for domain identifiers and values. Each newtype
//! ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// UUID-based ID types
// ============================================================================

/// Identifier of the user owning locally mirrored documents
///
/// The hosted backend supplies this as an opaque identity; the offline
/// layer only uses it for keying and index-filtered reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random UserId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a UserId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid UUID: {e}")))
    }
}

/// Identifier for a locally mirrored document (question, quiz, attempt, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a DocumentId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid UUID: {e}")))
    }
}

// ============================================================================
// Cache generation tag
// ============================================================================

/// Version tag identifying a cohort of cached static responses
///
/// Exactly one generation is current at any time; entries carrying any
/// other tag are eligible for deletion when a new generation activates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationTag(String);

impl GenerationTag {
    /// Maximum accepted tag length
    const MAX_LEN: usize = 64;

    /// Create a validated generation tag
    ///
    /// Tags must be non-empty, at most 64 characters, and consist of
    /// alphanumerics, `-`, `_`, or `.`.
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        if tag.is_empty() || tag.len() > Self::MAX_LEN {
            return Err(DomainError::InvalidGeneration(tag));
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(DomainError::InvalidGeneration(tag));
        }
        Ok(Self(tag))
    }

    /// Get the tag as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GenerationTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenerationTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// Request identity
// ============================================================================

/// The identity of a cacheable outgoing request: method plus full URL
///
/// Only GET requests are ever cached, but the method is kept in the key so
/// the stored identity is self-describing. The canonical string form is
/// `"METHOD url"`, which is also how keys are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a request key from an HTTP method and URL
    pub fn from_parts(method: &str, url: &Url) -> Result<Self, DomainError> {
        if method.is_empty() || !method.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::InvalidRequestKey(format!(
                "invalid method '{method}'"
            )));
        }
        Ok(Self(format!("{method} {url}")))
    }

    /// Build the key for a GET request to `url`
    #[must_use]
    pub fn get(url: &Url) -> Self {
        Self(format!("GET {url}"))
    }

    /// Get the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequestKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (method, rest) = s
            .split_once(' ')
            .ok_or_else(|| DomainError::InvalidRequestKey(s.to_string()))?;
        let url = Url::parse(rest).map_err(|e| {
            DomainError::InvalidRequestKey(format!("invalid URL in key '{s}': {e}"))
        })?;
        Self::from_parts(method, &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new();
        let parsed = UserId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_document_id_rejects_garbage() {
        assert!(DocumentId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_generation_tag_accepts_version_strings() {
        for tag in ["v1", "static-v2", "2026.02.1", "release_7"] {
            assert!(GenerationTag::new(tag).is_ok(), "tag '{tag}' should parse");
        }
    }

    #[test]
    fn test_generation_tag_rejects_invalid() {
        assert!(GenerationTag::new("").is_err());
        assert!(GenerationTag::new("has space").is_err());
        assert!(GenerationTag::new("x".repeat(65)).is_err());
    }

    #[test]
    fn test_request_key_get() {
        let url = Url::parse("https://api.example.com/rest/v1/questions?select=*").unwrap();
        let key = RequestKey::get(&url);
        assert_eq!(
            key.as_str(),
            "GET https://api.example.com/rest/v1/questions?select=*"
        );
    }

    #[test]
    fn test_request_key_roundtrip() {
        let url = Url::parse("https://example.com/manifest.json").unwrap();
        let key = RequestKey::from_parts("GET", &url).unwrap();
        let parsed = RequestKey::from_str(key.as_str()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_request_key_rejects_lowercase_method() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(RequestKey::from_parts("get", &url).is_err());
    }
}
