use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini v1beta generateContent request wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiToolDeclaration>>,
    #[serde(rename = "tool_config", skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<GeminiToolConfig>,
}

/// A content message in Gemini format. Also used for `systemInstruction`
/// and for response candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

/// A single part within a Gemini content message.
///
/// Part kinds the bridge does not translate (thoughts, video metadata, ...)
/// are captured by the trailing untagged variant so a request carrying them
/// still decodes; the translators drop them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeminiPart {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
    FunctionCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<Value>,
    },
    FunctionResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        response: Value,
    },
    #[serde(untagged)]
    Other(Value),
}

/// Generation config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

/// A tool declaration (contains function declarations).
///
/// Declarations stay as raw JSON: they cross the boundary 1:1 with only
/// their schema `type` casing rewritten, and fields the bridge does not
/// know about must survive untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiToolDeclaration {
    #[serde(default)]
    pub function_declarations: Vec<Value>,
}

/// Tool configuration (function calling mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Gemini generateContent response wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    pub candidates: Vec<GeminiCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

/// A candidate in the response. The bridge always produces exactly one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: GeminiContent,
    pub finish_reason: String,
}

/// Usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u64>,
}

/// countTokens response wire type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTokenCount {
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_text_request() {
        let req: GeminiRequest = serde_json::from_value(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
            "systemInstruction": {"parts": [{"text": "Be helpful"}]},
            "generationConfig": {"temperature": 0.7, "maxOutputTokens": 1024}
        }))
        .unwrap();

        assert_eq!(req.contents.len(), 1);
        assert_eq!(req.contents[0].role.as_deref(), Some("user"));
        match &req.contents[0].parts[0] {
            GeminiPart::Text(t) => assert_eq!(t, "Hello"),
            other => panic!("expected Text, got {other:?}"),
        }
        let gc = req.generation_config.unwrap();
        assert_eq!(gc.temperature, Some(0.7));
        assert_eq!(gc.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_decode_function_parts() {
        let req: GeminiRequest = serde_json::from_value(json!({
            "contents": [
                {"role": "model", "parts": [
                    {"functionCall": {"id": "fc-1", "name": "get_weather", "args": {"city": "SF"}}}
                ]},
                {"role": "user", "parts": [
                    {"functionResponse": {"id": "fc-1", "name": "get_weather", "response": {"temp": 72}}}
                ]}
            ]
        }))
        .unwrap();

        match &req.contents[0].parts[0] {
            GeminiPart::FunctionCall { id, name, args } => {
                assert_eq!(id.as_deref(), Some("fc-1"));
                assert_eq!(name, "get_weather");
                assert_eq!(args.as_ref().unwrap()["city"], "SF");
            }
            other => panic!("expected FunctionCall, got {other:?}"),
        }
        match &req.contents[1].parts[0] {
            GeminiPart::FunctionResponse { name, response, .. } => {
                assert_eq!(name, "get_weather");
                assert_eq!(response["temp"], 72);
            }
            other => panic!("expected FunctionResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_part_kind_decodes_as_other() {
        let req: GeminiRequest = serde_json::from_value(json!({
            "contents": [{"role": "user", "parts": [
                {"thought": true},
                {"text": "still here"}
            ]}]
        }))
        .unwrap();

        assert!(matches!(&req.contents[0].parts[0], GeminiPart::Other(_)));
        assert!(matches!(&req.contents[0].parts[1], GeminiPart::Text(_)));
    }

    #[test]
    fn test_inline_data_field_casing() {
        let part: GeminiPart = serde_json::from_value(json!({
            "inlineData": {"mimeType": "image/png", "data": "aGk="}
        }))
        .unwrap();
        match &part {
            GeminiPart::InlineData { mime_type, data } => {
                assert_eq!(mime_type, "image/png");
                assert_eq!(data, "aGk=");
            }
            other => panic!("expected InlineData, got {other:?}"),
        }
        let back = serde_json::to_value(&part).unwrap();
        assert_eq!(back["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn test_tool_config_uses_snake_case_key() {
        let req: GeminiRequest = serde_json::from_value(json!({
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
            "tool_config": {"mode": "ANY"}
        }))
        .unwrap();
        assert_eq!(req.tool_config.unwrap().mode.as_deref(), Some("ANY"));
    }

    #[test]
    fn test_encode_response_shape() {
        let resp = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: GeminiContent {
                    role: Some("model".into()),
                    parts: vec![GeminiPart::Text("Hi".into())],
                },
                finish_reason: "STOP".into(),
            }],
            usage_metadata: Some(GeminiUsageMetadata {
                prompt_token_count: Some(10),
                candidates_token_count: Some(5),
                total_token_count: Some(15),
            }),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["candidates"][0]["finishReason"], "STOP");
        assert_eq!(json["candidates"][0]["content"]["parts"][0]["text"], "Hi");
        assert_eq!(json["usageMetadata"]["promptTokenCount"], 10);
    }
}
