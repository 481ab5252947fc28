use serde_json::{json, Value};

use crate::config::UpstreamConfig;
use crate::protocol::gemini::{GeminiContent, GeminiPart, GeminiRequest};
use crate::protocol::mapping::gemini_role_to_openai;
use crate::protocol::openai::{
    OpenAiChatRequest, OpenAiFunctionCall, OpenAiFunctionName, OpenAiMessage,
    OpenAiResponseFormat, OpenAiTool, OpenAiToolCall, OpenAiToolChoice, OpenAiToolChoiceFunction,
};
use crate::protocol::schema::normalize_schema_types;

/// Name of the synthetic tool used to emulate schema-constrained JSON
/// output on backends without native structured-output support.
pub const JSON_OUTPUT_TOOL: &str = "json_output";

/// Synthesizes `call_N` identifiers for tool calls the source left
/// anonymous. One generator per translated request, so two anonymous calls
/// in the same turn never collide.
#[derive(Default)]
struct CallIdGenerator {
    next: usize,
}

impl CallIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("call_{}", self.next);
        self.next += 1;
        id
    }
}

/// Translate a Gemini generateContent request into the chat-completions
/// wire format.
///
/// The input is not mutated; the wire model name comes from the upstream
/// config, not from the URL the client asked for.
#[must_use]
pub fn to_openai_request(
    request: &GeminiRequest,
    stream: bool,
    upstream: &UpstreamConfig,
) -> OpenAiChatRequest {
    let mut call_ids = CallIdGenerator::default();
    let mut messages: Vec<OpenAiMessage> = request
        .contents
        .iter()
        .map(|content| translate_content(content, &mut call_ids))
        .collect();

    if let Some(instruction) = &request.system_instruction {
        messages.insert(
            0,
            OpenAiMessage {
                role: "system".to_string(),
                content: Value::String(instruction_text(instruction)),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        );
    }

    let mut out = OpenAiChatRequest {
        model: upstream.model.clone(),
        messages,
        stream,
        max_tokens: None,
        temperature: None,
        top_p: None,
        top_k: None,
        response_format: None,
        tools: None,
        tool_choice: None,
        thinking: None,
    };

    if let Some(gc) = &request.generation_config {
        out.max_tokens = gc.max_output_tokens;
        // Explicit zeros are real values and must survive the copy.
        out.temperature = gc.temperature;
        out.top_p = gc.top_p;
        out.top_k = gc.top_k;

        if gc.response_mime_type.as_deref() == Some("application/json") {
            if let Some(schema) = &gc.response_schema {
                out.response_format = Some(OpenAiResponseFormat {
                    type_: "json_object".to_string(),
                });
                out.tools = Some(vec![OpenAiTool {
                    type_: "function".to_string(),
                    function: json!({
                        "name": JSON_OUTPUT_TOOL,
                        "description":
                            "Format the output as a JSON object matching the provided schema.",
                        "parameters": normalize_schema_types(schema),
                    }),
                }]);
                out.tool_choice = Some(OpenAiToolChoice::Function(OpenAiToolChoiceFunction {
                    type_: "function".to_string(),
                    function: OpenAiFunctionName {
                        name: JSON_OUTPUT_TOOL.to_string(),
                    },
                }));
            }
        }
    }

    if let Some(tools) = &request.tools {
        let declared = tools
            .iter()
            .flat_map(|tool| tool.function_declarations.iter())
            .map(|declaration| OpenAiTool {
                type_: "function".to_string(),
                function: normalize_schema_types(declaration),
            });
        // Appended after any forced-JSON tool, never replacing it.
        out.tools.get_or_insert_with(Vec::new).extend(declared);
    }

    if let Some(mode) = request.tool_config.as_ref().and_then(|tc| tc.mode.clone()) {
        out.tool_choice = Some(OpenAiToolChoice::Mode(mode));
    }

    if upstream.enable_thinking {
        out.thinking = Some(true);
    }

    out
}

/// Translate one content entry. First match wins: a user turn answering a
/// tool call becomes a tool message even if it also carries prose, a model
/// turn requesting calls becomes an assistant tool-call message, and
/// everything else becomes plain content blocks.
fn translate_content(content: &GeminiContent, call_ids: &mut CallIdGenerator) -> OpenAiMessage {
    let role = gemini_role_to_openai(content.role.as_deref().unwrap_or("user"));

    if role == "user" {
        if let Some(message) = function_response_message(content, call_ids) {
            return message;
        }
    }
    if role == "assistant" {
        if let Some(message) = function_call_message(content, call_ids) {
            return message;
        }
    }

    let mut blocks: Vec<Value> = Vec::new();
    for part in &content.parts {
        match part {
            GeminiPart::Text(text) => blocks.push(json!({"type": "text", "text": text})),
            GeminiPart::InlineData { mime_type, data } => blocks.push(json!({
                "type": "image_url",
                "image_url": {"url": format!("data:{mime_type};base64,{data}")},
            })),
            // Function parts are handled above; anything else has no
            // chat-completions form.
            _ => {}
        }
    }

    let content = if blocks.is_empty() {
        Value::String(String::new())
    } else if blocks.len() == 1 && blocks[0]["type"] == "text" {
        // A lone text block collapses to a bare string, not a one-element list.
        blocks[0]["text"].take()
    } else {
        Value::Array(blocks)
    };

    OpenAiMessage {
        role: role.to_string(),
        content,
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

/// A user turn that carries a function response resolves to exactly one
/// tool message built from the first such part. A turn with several
/// responses is unspecified upstream; the rest are ignored.
fn function_response_message(
    content: &GeminiContent,
    call_ids: &mut CallIdGenerator,
) -> Option<OpenAiMessage> {
    content.parts.iter().find_map(|part| match part {
        GeminiPart::FunctionResponse { id, name, response } => Some(OpenAiMessage {
            role: "tool".to_string(),
            content: Value::String(
                serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string()),
            ),
            name: Some(name.clone()),
            tool_calls: None,
            tool_call_id: Some(
                id.clone().unwrap_or_else(|| call_ids.next_id()),
            ),
        }),
        _ => None,
    })
}

fn function_call_message(
    content: &GeminiContent,
    call_ids: &mut CallIdGenerator,
) -> Option<OpenAiMessage> {
    let calls: Vec<OpenAiToolCall> = content
        .parts
        .iter()
        .filter_map(|part| match part {
            GeminiPart::FunctionCall { id, name, args } => Some(OpenAiToolCall {
                id: id.clone().unwrap_or_else(|| call_ids.next_id()),
                type_: "function".to_string(),
                function: OpenAiFunctionCall {
                    name: name.clone(),
                    arguments: args
                        .as_ref()
                        .map(|a| serde_json::to_string(a).unwrap_or_else(|_| "{}".to_string()))
                        .unwrap_or_else(|| "{}".to_string()),
                },
            }),
            _ => None,
        })
        .collect();

    if calls.is_empty() {
        return None;
    }

    Some(OpenAiMessage {
        role: "assistant".to_string(),
        content: Value::Null,
        name: None,
        tool_calls: Some(calls),
        tool_call_id: None,
    })
}

fn instruction_text(instruction: &GeminiContent) -> String {
    instruction
        .parts
        .iter()
        .filter_map(|part| match part {
            GeminiPart::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::openai::OpenAiToolChoice;
    use serde_json::json;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig {
            base_url: "https://api.example.com/v1/chat/completions".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4".to_string(),
            azure_deployment: None,
            azure_api_version: None,
            enable_thinking: false,
        }
    }

    fn gemini(value: serde_json::Value) -> GeminiRequest {
        serde_json::from_value(value).expect("gemini request")
    }

    #[test]
    fn test_single_text_turn_collapses_to_bare_string() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello, world!"}]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.model, "gpt-4");
        assert!(!out.stream);
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].role, "user");
        assert_eq!(out.messages[0].content, json!("Hello, world!"));
    }

    #[test]
    fn test_multi_turn_order_and_role_mapping() {
        let request = gemini(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "First message"}]},
                {"role": "model", "parts": [{"text": "Second message"}]}
            ]
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.messages.len(), 2);
        assert_eq!(out.messages[0].role, "user");
        assert_eq!(out.messages[0].content, json!("First message"));
        assert_eq!(out.messages[1].role, "assistant");
        assert_eq!(out.messages[1].content, json!("Second message"));
    }

    #[test]
    fn test_system_instruction_is_always_first() {
        let request = gemini(json!({
            "systemInstruction": {"parts": [{"text": "You are a helpful assistant."}, {"text": "Be brief."}]},
            "contents": [{"role": "user", "parts": [{"text": "Hello!"}]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.messages[0].role, "system");
        assert_eq!(
            out.messages[0].content,
            json!("You are a helpful assistant.\nBe brief.")
        );
        assert_eq!(out.messages[1].role, "user");
    }

    #[test]
    fn test_temperature_zero_is_preserved() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
            "generationConfig": {"temperature": 0, "topP": 0, "topK": 0, "maxOutputTokens": 256}
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.temperature, Some(0.0));
        assert_eq!(out.top_p, Some(0.0));
        assert_eq!(out.top_k, Some(0));
        assert_eq!(out.max_tokens, Some(256));

        let wire = serde_json::to_value(&out).unwrap();
        assert_eq!(wire["temperature"], json!(0.0));
    }

    #[test]
    fn test_function_response_turn_becomes_tool_message() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [
                {"functionResponse": {"id": "fc-1", "name": "get_weather", "response": {"temp": 72}}},
                {"text": "prose that cannot also be represented"}
            ]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.messages.len(), 1);
        let msg = &out.messages[0];
        assert_eq!(msg.role, "tool");
        assert_eq!(msg.tool_call_id.as_deref(), Some("fc-1"));
        assert_eq!(msg.name.as_deref(), Some("get_weather"));
        assert_eq!(msg.content, json!("{\"temp\":72}"));
    }

    #[test]
    fn test_function_call_turn_gets_null_content_and_calls() {
        let request = gemini(json!({
            "contents": [{"role": "model", "parts": [
                {"functionCall": {"id": "fc-9", "name": "get_weather", "args": {"city": "SF"}}},
                {"functionCall": {"name": "get_time"}}
            ]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        let msg = &out.messages[0];
        assert_eq!(msg.role, "assistant");
        assert!(msg.content.is_null());
        let calls = msg.tool_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "fc-9");
        assert_eq!(calls[0].function.arguments, "{\"city\":\"SF\"}");
        // Missing args default to an empty object, missing ids are synthesized.
        assert_eq!(calls[1].function.arguments, "{}");
        assert_eq!(calls[1].id, "call_0");
    }

    #[test]
    fn test_anonymous_call_ids_never_collide() {
        let request = gemini(json!({
            "contents": [{"role": "model", "parts": [
                {"functionCall": {"name": "a"}},
                {"functionCall": {"name": "b"}}
            ]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        let calls = out.messages[0].tool_calls.as_ref().unwrap();
        assert_ne!(calls[0].id, calls[1].id);
    }

    #[test]
    fn test_mixed_content_stays_a_block_list() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [
                {"text": "what is this?"},
                {"inlineData": {"mimeType": "image/png", "data": "aGk="}}
            ]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        let blocks = out.messages[0].content.as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "text");
        assert_eq!(blocks[1]["image_url"]["url"], "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_untranslatable_parts_are_dropped() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"thought": true}]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        // Zero surviving blocks collapse to an empty string.
        assert_eq!(out.messages[0].content, json!(""));
    }

    #[test]
    fn test_forced_json_emulation() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "structured please"}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {"answer": {"type": "STRING"}}
                }
            }
        }));
        let out = to_openai_request(&request, false, &upstream());

        assert_eq!(out.response_format.as_ref().unwrap().type_, "json_object");
        let tools = out.tools.as_ref().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function["name"], JSON_OUTPUT_TOOL);
        assert_eq!(tools[0].function["parameters"]["type"], "object");
        assert_eq!(
            tools[0].function["parameters"]["properties"]["answer"]["type"],
            "string"
        );
        match out.tool_choice.as_ref().unwrap() {
            OpenAiToolChoice::Function(choice) => {
                assert_eq!(choice.function.name, JSON_OUTPUT_TOOL);
            }
            other => panic!("expected forced function choice, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_tools_append_to_forced_json_tool() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "go"}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"type": "OBJECT"}
            },
            "tools": [{"functionDeclarations": [{
                "name": "get_weather",
                "description": "Get weather",
                "parameters": {"type": "OBJECT", "properties": {"city": {"type": "STRING"}}}
            }]}]
        }));
        let out = to_openai_request(&request, false, &upstream());

        let tools = out.tools.as_ref().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].function["name"], JSON_OUTPUT_TOOL);
        assert_eq!(tools[1].function["name"], "get_weather");
        assert_eq!(
            tools[1].function["parameters"]["properties"]["city"]["type"],
            "string"
        );
    }

    #[test]
    fn test_tool_config_mode_is_copied_verbatim() {
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "go"}]}],
            "tools": [{"functionDeclarations": [{"name": "f", "parameters": {"type": "OBJECT"}}]}],
            "tool_config": {"mode": "ANY"}
        }));
        let out = to_openai_request(&request, false, &upstream());

        match out.tool_choice.as_ref().unwrap() {
            OpenAiToolChoice::Mode(mode) => assert_eq!(mode, "ANY"),
            other => panic!("expected mode choice, got {other:?}"),
        }
    }

    #[test]
    fn test_thinking_flag() {
        let mut cfg = upstream();
        cfg.enable_thinking = true;
        let request = gemini(json!({
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
        }));
        let out = to_openai_request(&request, true, &cfg);

        assert!(out.stream);
        assert_eq!(out.thinking, Some(true));
    }
}
