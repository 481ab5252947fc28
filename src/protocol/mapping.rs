//! Role and finish-reason spellings across the two protocols.

/// Gemini spelling of the end-of-turn finish reason.
pub const GEMINI_FINISH_STOP: &str = "STOP";
/// Gemini spelling of the tool-calls finish reason.
pub const GEMINI_FINISH_TOOL_CALLS: &str = "TOOL_CALLS";
/// Chat-completions spelling of the tool-calls finish reason.
pub const OPENAI_FINISH_TOOL_CALLS: &str = "tool_calls";
/// Default finish reason applied when the provider omits one.
pub const OPENAI_FINISH_STOP: &str = "stop";

/// Map a Gemini content role onto the chat-completions role set.
///
/// Gemini only distinguishes `model` from everything else; any other role
/// (including a missing one) is a user turn.
#[must_use]
pub fn gemini_role_to_openai(role: &str) -> &'static str {
    match role {
        "model" => "assistant",
        _ => "user",
    }
}

/// Map a chat-completions finish reason onto the Gemini spelling.
#[must_use]
pub fn openai_finish_to_gemini(reason: &str) -> String {
    match reason {
        "stop" => GEMINI_FINISH_STOP.to_string(),
        "tool_calls" => GEMINI_FINISH_TOOL_CALLS.to_string(),
        "length" => "MAX_TOKENS".to_string(),
        "content_filter" => "SAFETY".to_string(),
        other => other.to_ascii_uppercase(),
    }
}
