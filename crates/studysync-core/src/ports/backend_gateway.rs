//! Backend gateway port (driven/secondary port)
//!
//! The hosted backend is an opaque collaborator: per-collection CRUD, file
//! storage, and four AI function endpoints, each taking a JSON payload and
//! returning a JSON result or a structured error. The reconciler only ever
//! asks it to "replay this queued operation" and looks at the outcome.

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

use crate::domain::PendingOperation;

/// The AI invocation endpoints exposed by the backend's function runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiFunction {
    GenerateContent,
    GenerateQuiz,
    ExtractTextFromImage,
    ValidateQuizAnswers,
}

impl AiFunction {
    /// The function's endpoint name
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            AiFunction::GenerateContent => "generate-content",
            AiFunction::GenerateQuiz => "generate-quiz",
            AiFunction::ExtractTextFromImage => "extract-text-from-image",
            AiFunction::ValidateQuizAnswers => "validate-quiz-answers",
        }
    }
}

impl Display for AiFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// Result of replaying one pending operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The backend confirmed the mutation; the queue entry may be removed
    Confirmed,
    /// The backend answered but did not confirm (non-success status);
    /// the entry stays queued for the next reconciliation run
    Retry(String),
}

/// Port trait for the hosted backend
#[async_trait::async_trait]
pub trait IBackendGateway: Send + Sync {
    /// Replays a queued mutation against the matching backend endpoint
    ///
    /// `Err` means the network was unreachable; like [`ReplayOutcome::Retry`]
    /// it leaves the entry queued.
    async fn replay(&self, operation: &PendingOperation) -> anyhow::Result<ReplayOutcome>;

    /// Uploads a file to backend storage, returning its public URL
    async fn upload_file(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> anyhow::Result<String>;

    /// Deletes a file from backend storage
    async fn delete_file(&self, path: &str) -> anyhow::Result<()>;

    /// Invokes one of the AI function endpoints with an opaque JSON payload
    async fn invoke_function(&self, function: AiFunction, payload: &Value) -> anyhow::Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_endpoints() {
        assert_eq!(AiFunction::GenerateContent.endpoint(), "generate-content");
        assert_eq!(AiFunction::GenerateQuiz.endpoint(), "generate-quiz");
        assert_eq!(
            AiFunction::ExtractTextFromImage.endpoint(),
            "extract-text-from-image"
        );
        assert_eq!(
            AiFunction::ValidateQuizAnswers.endpoint(),
            "validate-quiz-answers"
        );
    }
}
