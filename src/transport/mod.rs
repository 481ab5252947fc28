use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::BridgeError;
use crate::protocol::openai::OpenAiChatRequest;

/// HTTP client for one OpenAI-compatible upstream.
///
/// Held by the application state and passed into each exchange explicitly;
/// nothing in the process is patched globally to intercept outbound calls.
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    azure: bool,
}

impl UpstreamClient {
    /// Build the client for the configured upstream.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(upstream: &UpstreamConfig, timeout_secs: u64) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BridgeError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: chat_completions_url(upstream),
            api_key: upstream.api_key.clone(),
            azure: upstream.is_azure(),
        })
    }

    /// The resolved chat-completions endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the translated request to the upstream.
    ///
    /// A non-success status fails the exchange with the upstream status and
    /// body; there is no automatic retry.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] when the request cannot be sent
    /// and [`BridgeError::Upstream`] on a non-success response status.
    pub async fn execute(
        &self,
        request: &OpenAiChatRequest,
    ) -> Result<reqwest::Response, BridgeError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| BridgeError::Transport(format!("failed to encode upstream request: {e}")))?;

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        builder = if self.azure {
            // Azure authenticates with a bare key header instead of a bearer token.
            builder.header("api-key", &self.api_key)
        } else {
            builder.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
        };

        let response = builder
            .send()
            .await
            .map_err(|e| BridgeError::Transport(format!("upstream request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {e}"));
            tracing::error!("upstream returned {status}: {message}");
            return Err(BridgeError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

/// Build the chat-completions URL for an upstream. A standard backend's
/// `base_url` already names the endpoint; Azure deployments use a
/// deployment-scoped path with the API version as a query parameter.
fn chat_completions_url(upstream: &UpstreamConfig) -> String {
    match (&upstream.azure_deployment, &upstream.azure_api_version) {
        (Some(deployment), Some(api_version)) => {
            let base = upstream.base_url.trim_end_matches('/');
            format!("{base}/openai/deployments/{deployment}/chat/completions?api-version={api_version}")
        }
        _ => upstream.base_url.clone(),
    }
}
