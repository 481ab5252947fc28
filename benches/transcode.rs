use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gembridge::config::UpstreamConfig;
use gembridge::protocol::gemini::GeminiRequest;
use gembridge::stream::StreamTranscoder;
use gembridge::translate::to_openai_request;
use serde_json::json;

fn text_stream_input() -> Vec<Vec<u8>> {
    let mut chunks = Vec::with_capacity(65);
    for i in 0..64 {
        chunks.push(
            format!(
                "data: {{\"choices\":[{{\"delta\":{{\"content\":\"token {i} \"}}}}]}}\n\n"
            )
            .into_bytes(),
        );
    }
    chunks.push(b"data: [DONE]\n\n".to_vec());
    chunks
}

fn tool_stream_input() -> Vec<Vec<u8>> {
    let mut chunks = vec![
        br#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"search","arguments":""}}]}}]}"#.to_vec(),
    ];
    for i in 0..32 {
        chunks.push(
            format!(
                "data: {{\"choices\":[{{\"delta\":{{\"tool_calls\":[{{\"index\":0,\"function\":{{\"arguments\":\"x{i}\"}}}}]}}}}]}}\n\n"
            )
            .into_bytes(),
        );
    }
    chunks.push(br#"data: {"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#.to_vec());
    chunks.push(b"data: [DONE]\n\n".to_vec());
    for chunk in &mut chunks {
        if !chunk.ends_with(b"\n\n") {
            chunk.extend_from_slice(b"\n\n");
        }
    }
    chunks
}

fn bench_transcode_text(c: &mut Criterion) {
    let chunks = text_stream_input();
    c.bench_function("transcode_text_stream", |b| {
        b.iter(|| {
            let mut transcoder = StreamTranscoder::new();
            let mut frames = Vec::new();
            for chunk in &chunks {
                transcoder.feed_into(black_box(chunk), &mut frames);
            }
            black_box(frames.len())
        });
    });
}

fn bench_transcode_tool_calls(c: &mut Criterion) {
    let chunks = tool_stream_input();
    c.bench_function("transcode_tool_call_stream", |b| {
        b.iter(|| {
            let mut transcoder = StreamTranscoder::new();
            let mut frames = Vec::new();
            for chunk in &chunks {
                transcoder.feed_into(black_box(chunk), &mut frames);
            }
            black_box(frames.len())
        });
    });
}

fn bench_request_translation(c: &mut Criterion) {
    let upstream = UpstreamConfig {
        base_url: "https://api.example.com/v1/chat/completions".to_string(),
        api_key: "sk-bench".to_string(),
        model: "gpt-4o-mini".to_string(),
        azure_deployment: None,
        azure_api_version: None,
        enable_thinking: false,
    };
    let request: GeminiRequest = serde_json::from_value(json!({
        "systemInstruction": {"parts": [{"text": "You are a helpful assistant"}]},
        "contents": [
            {"role": "user", "parts": [{"text": "What is the weather in SF?"}]},
            {"role": "model", "parts": [{"functionCall": {"id": "call_1", "name": "get_weather", "args": {"city": "SF"}}}]},
            {"role": "user", "parts": [{"functionResponse": {"id": "call_1", "name": "get_weather", "response": {"temp": 72}}}]}
        ],
        "tools": [{"functionDeclarations": [{
            "name": "get_weather",
            "description": "Get weather",
            "parameters": {"type": "OBJECT", "properties": {"city": {"type": "STRING"}}}
        }]}]
    }))
    .expect("bench request");

    c.bench_function("translate_request", |b| {
        b.iter(|| black_box(to_openai_request(black_box(&request), false, &upstream)));
    });
}

criterion_group!(
    benches,
    bench_transcode_text,
    bench_transcode_tool_calls,
    bench_request_translation
);
criterion_main!(benches);
