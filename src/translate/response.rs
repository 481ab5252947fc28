use serde_json::{Map, Value};

use crate::protocol::gemini::{
    GeminiCandidate, GeminiContent, GeminiPart, GeminiResponse, GeminiUsageMetadata,
};
use crate::protocol::mapping::{
    openai_finish_to_gemini, GEMINI_FINISH_STOP, OPENAI_FINISH_STOP, OPENAI_FINISH_TOOL_CALLS,
};
use crate::protocol::openai::OpenAiChatResponse;
use crate::translate::request::JSON_OUTPUT_TOOL;

/// Translate a chat-completions response into the Gemini wire format.
///
/// Total over any well-formed provider response: missing optional fields
/// fall back to documented defaults rather than failing. Works on both the
/// single-shot `message` shape and a streamed `delta` event.
#[must_use]
pub fn to_gemini_response(response: &OpenAiChatResponse) -> GeminiResponse {
    let choice = response.choices.first();
    let turn = choice.and_then(|c| c.turn());
    let provider_finish = response
        .stop_reason
        .as_deref()
        .or_else(|| choice.and_then(|c| c.finish_reason.as_deref()))
        .unwrap_or(OPENAI_FINISH_STOP);
    let mut finish_reason = openai_finish_to_gemini(provider_finish);

    let mut parts: Vec<GeminiPart> = Vec::new();

    if provider_finish == OPENAI_FINISH_TOOL_CALLS {
        if let Some(calls) = turn.and_then(|t| t.tool_calls.as_ref()) {
            if let Some(json_call) = calls
                .iter()
                .find(|call| call.function_name() == Some(JSON_OUTPUT_TOOL))
            {
                // Forced-JSON emulation unwrap: the synthetic call's raw
                // arguments string is the whole textual answer, and the
                // caller sees a plain completed turn.
                parts.push(GeminiPart::Text(
                    json_call.function_arguments().unwrap_or_default().to_string(),
                ));
                finish_reason = GEMINI_FINISH_STOP.to_string();
            } else {
                for call in calls {
                    parts.push(GeminiPart::FunctionCall {
                        id: call.id.clone(),
                        name: call.function_name().unwrap_or_default().to_string(),
                        args: Some(decode_tool_arguments(call.function_arguments())),
                    });
                }
            }
        }
    }

    if parts.is_empty() {
        if let Some(content) = turn.and_then(|t| t.content.as_deref()) {
            parts.push(GeminiPart::Text(content.to_string()));
        }
    }

    // Callers must never receive zero parts.
    if parts.is_empty() {
        parts.push(GeminiPart::Text(String::new()));
    }

    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: GeminiContent {
                role: Some("model".to_string()),
                parts,
            },
            finish_reason,
        }],
        usage_metadata: response.usage.as_ref().map(|usage| GeminiUsageMetadata {
            prompt_token_count: usage.prompt_tokens,
            candidates_token_count: usage.completion_tokens,
            total_token_count: usage.total_tokens,
        }),
    }
}

/// Decode a tool call's assembled arguments string into a native object.
/// Absent or malformed arguments degrade to `{}` rather than failing the
/// exchange.
#[must_use]
pub(crate) fn decode_tool_arguments(arguments: Option<&str>) -> Value {
    let Some(raw) = arguments else {
        return Value::Object(Map::new());
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("tool-call arguments were not valid JSON, substituting {{}}: {err}");
            Value::Object(Map::new())
        }
    }
}
