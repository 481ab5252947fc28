use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat Completions request wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAiResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<OpenAiToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<bool>,
}

/// A message in a Chat Completions request.
///
/// `content` is deliberately a raw JSON value: the wire contract needs a
/// bare string for single-text messages, a block list for mixed content,
/// and an explicit `null` for assistant messages that only carry tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A fully-formed tool call within a request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub function: OpenAiFunctionCall,
}

/// The function part of a tool call. `arguments` is always a JSON-encoded
/// string on this side of the boundary, never a native object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A tool definition. The function declaration stays as raw JSON so the
/// Gemini declaration crosses 1:1 (schema casing aside).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiTool {
    #[serde(rename = "type")]
    pub type_: String,
    pub function: Value,
}

/// `tool_choice` field: either a mode string or a forced function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenAiToolChoice {
    Mode(String),
    Function(OpenAiToolChoiceFunction),
}

/// `tool_choice` object form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolChoiceFunction {
    #[serde(rename = "type")]
    pub type_: String,
    pub function: OpenAiFunctionName,
}

/// Nested function selector in `tool_choice`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionName {
    pub name: String,
}

/// `response_format` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    pub type_: String,
}

// ---------------------------------------------------------------------------
// Response side
// ---------------------------------------------------------------------------

/// Chat Completions response wire type, covering both the single-shot shape
/// (`choices[].message`) and streamed chunks (`choices[].delta`).
///
/// Every field is optional-with-default: the translator is total over any
/// well-formed provider response and must not reject partial stream events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiChatResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAiUsage>,
    #[serde(default, alias = "StopReason", skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// A single choice in a response or stream chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<OpenAiAssistantTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<OpenAiAssistantTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The assistant payload of a choice: a complete `message` or an
/// incremental `delta`, structurally the same superset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiAssistantTurn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCallDelta>>,
}

/// A tool call as it appears in responses: complete in a `message`, or a
/// fragment in a `delta` where `arguments` may be split across many events
/// keyed by `index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiToolCallDelta {
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<OpenAiFunctionDelta>,
}

/// Function fragment within a response tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiFunctionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Usage info in the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

impl OpenAiChoice {
    /// The assistant payload, preferring the single-shot `message` over the
    /// streamed `delta` when both are present.
    #[must_use]
    pub fn turn(&self) -> Option<&OpenAiAssistantTurn> {
        self.message.as_ref().or(self.delta.as_ref())
    }
}

impl OpenAiToolCallDelta {
    #[must_use]
    pub fn function_name(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.name.as_deref())
    }

    #[must_use]
    pub fn function_arguments(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.arguments.as_deref())
    }
}
