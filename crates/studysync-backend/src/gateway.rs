//! Backend gateway adapter
//!
//! Implements the `IBackendGateway` port by mapping each queued mutation
//! onto the matching backend endpoint. The gateway never interprets
//! payloads beyond the key fields it needs for REST filters; everything
//! else is forwarded verbatim.

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};

use studysync_core::config::BackendConfig;
use studysync_core::domain::{Collection, PendingOperation, SyncAction};
use studysync_core::ports::{AiFunction, IBackendGateway, ReplayOutcome};

use crate::client::RestClient;
use crate::BackendError;

/// `IBackendGateway` implementation over the backend's REST surface
pub struct RestBackendGateway {
    client: RestClient,
}

impl RestBackendGateway {
    /// Creates a gateway from the backend configuration
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = RestClient::new(&config.base_url, config.api_key.clone())
            .context("Failed to construct backend client")?;
        Ok(Self { client })
    }

    /// Creates a gateway around an existing client (useful for testing)
    pub fn with_client(client: RestClient) -> Self {
        Self { client }
    }

    /// Row filter for update/delete, derived from the queued payload
    ///
    /// Non-composite collections filter on `id`; favorites filter on the
    /// `(user_id, question_id)` pair.
    fn row_filter(
        collection: Collection,
        payload: &Value,
    ) -> Result<Vec<(String, String)>, BackendError> {
        let field = |name: &str| -> Result<String, BackendError> {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| {
                    BackendError::MalformedPayload(format!(
                        "missing '{name}' in {} payload",
                        collection.name()
                    ))
                })
        };

        if collection.has_composite_key() {
            Ok(vec![
                ("user_id".to_string(), format!("eq.{}", field("user_id")?)),
                (
                    "question_id".to_string(),
                    format!("eq.{}", field("question_id")?),
                ),
            ])
        } else {
            Ok(vec![("id".to_string(), format!("eq.{}", field("id")?))])
        }
    }

    /// String field helper for file-operation payloads
    fn payload_str<'a>(payload: &'a Value, name: &str) -> Result<&'a str, BackendError> {
        payload.get(name).and_then(Value::as_str).ok_or_else(|| {
            BackendError::MalformedPayload(format!("missing '{name}' in file payload"))
        })
    }

    /// Issues the wire request for one operation and returns its status
    async fn send(&self, operation: &PendingOperation) -> anyhow::Result<u16> {
        let http = self.client.http();

        let response = match operation.action {
            SyncAction::Create(collection) => {
                let url = self.client.rest_url(collection.name())?;
                self.client
                    .authorize(http.post(url))
                    .json(&operation.payload)
                    .send()
                    .await?
            }
            SyncAction::Update(collection) => {
                let url = self.client.rest_url(collection.name())?;
                let filter = Self::row_filter(collection, &operation.payload)?;
                self.client
                    .authorize(http.patch(url))
                    .query(&filter)
                    .json(&operation.payload)
                    .send()
                    .await?
            }
            SyncAction::Delete(collection) => {
                let url = self.client.rest_url(collection.name())?;
                let filter = Self::row_filter(collection, &operation.payload)?;
                self.client
                    .authorize(http.delete(url))
                    .query(&filter)
                    .send()
                    .await?
            }
            SyncAction::UploadFile => {
                let path = Self::payload_str(&operation.payload, "path")?;
                let content_type = Self::payload_str(&operation.payload, "content_type")?;
                let data = Self::payload_str(&operation.payload, "data_base64")?;
                let bytes = BASE64.decode(data).map_err(|e| {
                    BackendError::MalformedPayload(format!("invalid file data: {e}"))
                })?;
                let url = self.client.storage_url(path)?;
                self.client
                    .authorize(http.post(url))
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes)
                    .send()
                    .await?
            }
            SyncAction::DeleteFile => {
                let path = Self::payload_str(&operation.payload, "path")?;
                let url = self.client.storage_url(path)?;
                self.client.authorize(http.delete(url)).send().await?
            }
        };

        Ok(response.status().as_u16())
    }
}

#[async_trait::async_trait]
impl IBackendGateway for RestBackendGateway {
    async fn replay(&self, operation: &PendingOperation) -> anyhow::Result<ReplayOutcome> {
        debug!(
            id = operation.id,
            action = %operation.action,
            "Replaying pending operation"
        );

        let status = self.send(operation).await?;
        if (200..300).contains(&status) {
            Ok(ReplayOutcome::Confirmed)
        } else {
            warn!(
                id = operation.id,
                action = %operation.action,
                status,
                "Backend did not confirm replay"
            );
            Ok(ReplayOutcome::Retry(format!("status {status}")))
        }
    }

    async fn upload_file(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> anyhow::Result<String> {
        let url = self.client.storage_url(path)?;
        let response = self
            .client
            .authorize(self.client.http().post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(BackendError::Rejected { status }.into());
        }

        Ok(self.client.public_storage_url(path)?.to_string())
    }

    async fn delete_file(&self, path: &str) -> anyhow::Result<()> {
        let url = self.client.storage_url(path)?;
        let response = self
            .client
            .authorize(self.client.http().delete(url))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(BackendError::Rejected { status }.into());
        }
        Ok(())
    }

    async fn invoke_function(
        &self,
        function: AiFunction,
        payload: &Value,
    ) -> anyhow::Result<Value> {
        let url = self.client.function_url(function.endpoint())?;
        debug!(function = %function, "Invoking backend function");

        let response = self
            .client
            .authorize(self.client.http().post(url))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(BackendError::Rejected { status }.into());
        }

        let body = response.json::<Value>().await?;
        Ok(body)
    }
}
