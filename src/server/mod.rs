use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use futures_util::StreamExt;

use crate::error::BridgeError;
use crate::observability::token_counter::estimate_request_tokens;
use crate::protocol::gemini::{GeminiRequest, GeminiTokenCount};
use crate::protocol::openai::OpenAiChatResponse;
use crate::state::AppState;
use crate::stream::transcode_stream;
use crate::translate::{to_gemini_response, to_openai_request};

/// Build the bridge router serving the Gemini v1beta surface.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1beta/models/{model_call}", post(handle_model_call))
        .with_state(state)
}

async fn handle_model_call(
    State(state): State<Arc<AppState>>,
    Path(model_call): Path<String>,
    body: Bytes,
) -> Response {
    match dispatch(&state, &model_call, &body).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn dispatch(state: &AppState, model_call: &str, body: &[u8]) -> Result<Response, BridgeError> {
    let (model, action) = parse_model_call(model_call)?;

    let request: GeminiRequest = serde_json::from_slice(body).map_err(|e| {
        BridgeError::InvalidRequest(format!("malformed generateContent request: {e}"))
    })?;

    tracing::info!(model, action, "handling Gemini exchange");
    if let Some(log) = &state.debug_log {
        log.record_value("Original Gemini request", &request);
    }

    match action {
        "generateContent" => generate(state, &request).await,
        "streamGenerateContent" => stream_generate(state, &request).await,
        "countTokens" => count_tokens(state, &request),
        other => Err(BridgeError::InvalidRequest(format!(
            "unsupported action: {other}"
        ))),
    }
}

/// Split a `{model}:{action}` path segment.
fn parse_model_call(model_call: &str) -> Result<(&str, &str), BridgeError> {
    model_call
        .split_once(':')
        .filter(|(model, action)| !model.is_empty() && !action.is_empty())
        .ok_or_else(|| {
            BridgeError::InvalidRequest(format!("missing action in model path: {model_call}"))
        })
}

async fn generate(state: &AppState, request: &GeminiRequest) -> Result<Response, BridgeError> {
    let upstream_request = to_openai_request(request, false, &state.config.upstream);
    if let Some(log) = &state.debug_log {
        log.record_value("Translated OpenAI request", &upstream_request);
    }

    let response = state.upstream.execute(&upstream_request).await?;
    let raw = response.text().await.map_err(|e| {
        BridgeError::Transport(format!("failed to read upstream response: {e}"))
    })?;
    if let Some(log) = &state.debug_log {
        log.record("Raw OpenAI response", &raw);
    }

    let provider: OpenAiChatResponse = serde_json::from_str(&raw).map_err(|e| {
        BridgeError::Transport(format!("upstream returned an unparseable response: {e}"))
    })?;
    let reply = to_gemini_response(&provider);
    if let Some(log) = &state.debug_log {
        log.record_value("Translated Gemini response", &reply);
    }
    Ok(axum::Json(reply).into_response())
}

async fn stream_generate(
    state: &AppState,
    request: &GeminiRequest,
) -> Result<Response, BridgeError> {
    let upstream_request = to_openai_request(request, true, &state.config.upstream);
    if let Some(log) = &state.debug_log {
        log.record_value("Translated OpenAI request", &upstream_request);
    }

    let response = state.upstream.execute(&upstream_request).await?;
    let frames = transcode_stream(response.bytes_stream());
    let body = Body::from_stream(frames.map(Ok::<Bytes, std::convert::Infallible>));
    Ok((
        [(http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response())
}

/// The upstream has no countTokens equivalent, so the endpoint is answered
/// locally with an estimate.
fn count_tokens(state: &AppState, request: &GeminiRequest) -> Result<Response, BridgeError> {
    tracing::warn!("countTokens is not supported by the upstream; returning an estimate");
    let reply = GeminiTokenCount {
        total_tokens: estimate_request_tokens(request),
    };
    if let Some(log) = &state.debug_log {
        log.record_value("Estimated token count", &reply);
    }
    Ok(axum::Json(reply).into_response())
}
