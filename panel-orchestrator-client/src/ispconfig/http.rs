//! ISPConfig request helpers
//!
//! One `call` per remote function: the function name rides in the query
//! string, the session id is injected into the JSON body, and the envelope
//! is unwrapped into either the typed response or a mapped fault.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::http_client::HttpUtils;

use super::error::{map_remote_fault, FaultContext};
use super::types::RemoteResponse;
use super::IspconfigSession;

impl RemoteResponse {
    /// Unwrap the envelope: `code == "ok"` yields the typed payload,
    /// anything else is mapped to a structured fault.
    pub(crate) fn into_result<T: DeserializeOwned>(
        self,
        method: &str,
        context: FaultContext,
    ) -> Result<T> {
        if self.code == "ok" {
            let value = self.response.ok_or_else(|| ClientError::Parse {
                method: method.to_string(),
                detail: "missing 'response' field in ok envelope".to_string(),
            })?;
            serde_json::from_value(value).map_err(|e| ClientError::Parse {
                method: method.to_string(),
                detail: e.to_string(),
            })
        } else {
            Err(map_remote_fault(method, &self.code, self.message, context))
        }
    }
}

impl IspconfigSession {
    /// Serialize `body`, inject the session id, and return the final JSON
    /// object for a remote call.
    fn body_with_session<B: Serialize>(&self, method: &str, body: &B) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(body).map_err(|e| ClientError::Serialization {
            method: method.to_string(),
            detail: e.to_string(),
        })?;

        let Some(object) = value.as_object_mut() else {
            return Err(ClientError::Serialization {
                method: method.to_string(),
                detail: "request body must serialize to a JSON object".to_string(),
            });
        };
        object.insert(
            "session_id".to_string(),
            serde_json::Value::String(self.session_id.clone()),
        );

        Ok(value)
    }

    /// Execute a remote call without transport retries.
    ///
    /// Used for creation calls: re-sending a create that the panel already
    /// processed fails with a duplicate-resource fault, so transient errors
    /// must surface to the caller instead of being retried here.
    pub(crate) async fn call<T, B>(&self, method: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call_inner(method, body, FaultContext::default(), 0)
            .await
    }

    /// Execute a remote call with a fault context for error mapping.
    pub(crate) async fn call_with_context<T, B>(
        &self,
        method: &str,
        body: &B,
        context: FaultContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call_inner(method, body, context, 0).await
    }

    /// Execute an idempotent read with transient-failure retries.
    pub(crate) async fn call_read<T, B>(&self, method: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call_inner(method, body, FaultContext::default(), super::READ_MAX_RETRIES)
            .await
    }

    async fn call_inner<T, B>(
        &self,
        method: &str,
        body: &B,
        context: FaultContext,
        max_retries: u32,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload = self.body_with_session(method, body)?;
        let url = format!("{}?{method}", self.endpoint);
        let request = self.client.post(&url).json(&payload);

        let (_, response_text) =
            HttpUtils::execute_request_with_retry(request, method, max_retries).await?;
        let envelope: RemoteResponse = HttpUtils::parse_json(&response_text, method)?;
        envelope.into_result(method, context)
    }
}
