//! Cached HTTP responses and cache partitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::errors::DomainError;
use super::newtypes::{GenerationTag, RequestKey};

/// Storage partition for cached responses
///
/// `Static` holds the pre-populated application shell; `Dynamic` holds
/// API responses and assets cached opportunistically. Partitions are
/// independently addressable and evictable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePartition {
    Static,
    Dynamic,
}

impl CachePartition {
    /// The persisted partition name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CachePartition::Static => "static",
            CachePartition::Dynamic => "dynamic",
        }
    }

    /// Parse a partition from its persisted name
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name {
            "static" => Ok(CachePartition::Static),
            "dynamic" => Ok(CachePartition::Dynamic),
            other => Err(DomainError::InvalidPartition(other.to_string())),
        }
    }
}

impl Display for CachePartition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CachePartition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A serialized HTTP response held in a cache partition
///
/// At most one entry exists per request key per partition; a `put` with an
/// existing key replaces the previous copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// Request identity this response satisfies
    pub key: RequestKey,
    /// Which partition holds the entry
    pub partition: CachePartition,
    /// Generation cohort the entry belongs to
    pub generation: GenerationTag,
    /// HTTP status of the stored response
    pub status: u16,
    /// Content-Type header, if the response carried one
    pub content_type: Option<String>,
    /// Remaining response headers, name/value pairs in wire order
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub body: Vec<u8>,
    /// When the entry was stored
    pub inserted_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Whether the stored status is a success (2xx)
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_partition_name_roundtrip() {
        for partition in [CachePartition::Static, CachePartition::Dynamic] {
            assert_eq!(CachePartition::from_name(partition.name()).unwrap(), partition);
        }
        assert!(CachePartition::from_name("archive").is_err());
    }

    #[test]
    fn test_is_success() {
        let url = Url::parse("https://example.com/").unwrap();
        let mut entry = CachedResponse {
            key: RequestKey::get(&url),
            partition: CachePartition::Dynamic,
            generation: GenerationTag::new("v1").unwrap(),
            status: 200,
            content_type: Some("application/json".to_string()),
            headers: Vec::new(),
            body: b"{}".to_vec(),
            inserted_at: Utc::now(),
        };
        assert!(entry.is_success());
        entry.status = 503;
        assert!(!entry.is_success());
    }
}
