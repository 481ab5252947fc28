use std::collections::{BTreeMap, VecDeque};

use bytes::Bytes;
use futures_util::Stream;

use crate::error::gemini_error_payload;
use crate::protocol::gemini::{GeminiCandidate, GeminiContent, GeminiPart, GeminiResponse};
use crate::protocol::mapping::{GEMINI_FINISH_TOOL_CALLS, OPENAI_FINISH_TOOL_CALLS};
use crate::protocol::openai::{OpenAiChatResponse, OpenAiToolCallDelta};
use crate::translate::response::{decode_tool_arguments, to_gemini_response};

use super::sse::{data_frame, data_payload, done_frame, is_done_payload, SseLineBuffer};

/// A tool call under reassembly from fragmented stream deltas.
#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Per-stream reassembly state for tool-call fragments, keyed by the
/// provider's zero-based call index.
///
/// `id` and `name` are set once by the first fragment carrying them;
/// argument fragments are appended in arrival order, since a single JSON
/// value may be split across many events.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u32, PendingToolCall>,
}

impl ToolCallAccumulator {
    fn absorb(&mut self, delta: &OpenAiToolCallDelta) {
        let entry = self.calls.entry(delta.index).or_default();
        if entry.id.is_none() {
            entry.id = delta.id.clone();
        }
        if let Some(function) = &delta.function {
            if entry.name.is_none() {
                entry.name = function.name.clone();
            }
            if let Some(fragment) = &function.arguments {
                entry.arguments.push_str(fragment);
            }
        }
    }

    /// Drain every accumulated call into completed function-call parts, in
    /// ascending index order, leaving the accumulator clean for a later
    /// batch within the same stream.
    fn flush(&mut self) -> Vec<GeminiPart> {
        std::mem::take(&mut self.calls)
            .into_values()
            .map(|call| {
                let arguments = if call.arguments.is_empty() {
                    None
                } else {
                    Some(call.arguments.as_str())
                };
                GeminiPart::FunctionCall {
                    id: call.id,
                    name: call.name.unwrap_or_default(),
                    args: Some(decode_tool_arguments(arguments)),
                }
            })
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Transcodes one provider event stream into Gemini SSE frames.
///
/// A transcoder is bound to exactly one in-flight exchange: it owns the
/// line buffer and the tool-call accumulator for that stream and is never
/// shared across streams. After the terminal sentinel has been seen,
/// further bytes produce no frames.
pub struct StreamTranscoder {
    lines: SseLineBuffer,
    scratch: Vec<String>,
    calls: ToolCallAccumulator,
    done: bool,
}

impl StreamTranscoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: SseLineBuffer::new(),
            scratch: Vec::new(),
            calls: ToolCallAccumulator::default(),
            done: false,
        }
    }

    /// Whether the stream has reached its terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw bytes from the provider stream, appending any completed
    /// Gemini frames (terminator included) to `out`.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<String>) {
        if self.done {
            return;
        }
        let mut lines = std::mem::take(&mut self.scratch);
        lines.clear();
        self.lines.feed_into(chunk, &mut lines);
        for line in &lines {
            if self.done {
                break;
            }
            self.process_line(line, out);
        }
        self.scratch = lines;
    }

    /// Close the stream after the provider source ended without the
    /// terminal sentinel; treated as normal completion.
    pub fn finish_into(&mut self, out: &mut Vec<String>) {
        if self.done {
            return;
        }
        self.done = true;
        out.push(done_frame());
    }

    /// Close the stream after the provider source failed mid-flight.
    ///
    /// One terminal error frame precedes the terminator so callers can
    /// tell a failed stream from a completed one.
    pub fn fail_into(&mut self, message: &str, out: &mut Vec<String>) {
        if self.done {
            return;
        }
        self.done = true;
        let payload = gemini_error_payload(502, "UNAVAILABLE", message);
        out.push(data_frame(
            &serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string()),
        ));
        out.push(done_frame());
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<String>) {
        let Some(payload) = data_payload(line) else {
            return;
        };
        if is_done_payload(payload) {
            self.done = true;
            out.push(done_frame());
            return;
        }
        let event: OpenAiChatResponse = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(err) => {
                // One bad line never aborts the stream.
                tracing::warn!("skipping malformed stream event: {err}");
                return;
            }
        };
        self.process_event(&event, out);
    }

    fn process_event(&mut self, event: &OpenAiChatResponse, out: &mut Vec<String>) {
        let Some(choice) = event.choices.first() else {
            return;
        };

        if let Some(turn) = choice.turn() {
            if turn.content.as_deref().is_some_and(|c| !c.is_empty()) {
                out.push(frame(&to_gemini_response(event)));
            }
            if let Some(deltas) = &turn.tool_calls {
                for delta in deltas {
                    self.calls.absorb(delta);
                }
            }
        }

        if choice.finish_reason.as_deref() == Some(OPENAI_FINISH_TOOL_CALLS)
            && !self.calls.is_empty()
        {
            let parts = self.calls.flush();
            out.push(frame(&GeminiResponse {
                candidates: vec![GeminiCandidate {
                    content: GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    },
                    finish_reason: GEMINI_FINISH_TOOL_CALLS.to_string(),
                }],
                usage_metadata: None,
            }));
        }
    }
}

impl Default for StreamTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

fn frame(response: &GeminiResponse) -> String {
    data_frame(&serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string()))
}

// ---------------------------------------------------------------------------
// Stream adapter
// ---------------------------------------------------------------------------

/// Drive a provider byte stream through a [`StreamTranscoder`], yielding
/// one complete Gemini SSE frame per item.
///
/// The sequence is lazy and non-restartable: bytes are pulled only as the
/// consumer polls, so sink backpressure propagates to the source. Dropping
/// the returned stream mid-flight drops the source with it; nothing is
/// held beyond the transcoder's own line and accumulator state.
pub fn transcode_stream<S, E>(source: S) -> impl Stream<Item = Bytes> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    use futures_util::StreamExt;

    futures_util::stream::unfold(
        (
            Box::pin(source),
            StreamTranscoder::new(),
            VecDeque::<String>::new(),
            false,
        ),
        |(mut source, mut transcoder, mut pending, mut source_done)| async move {
            loop {
                if let Some(next) = pending.pop_front() {
                    return Some((Bytes::from(next), (source, transcoder, pending, source_done)));
                }
                if transcoder.is_done() || source_done {
                    return None;
                }

                let mut frames = Vec::new();
                match source.as_mut().next().await {
                    Some(Ok(bytes)) => transcoder.feed_into(&bytes, &mut frames),
                    Some(Err(err)) => {
                        tracing::warn!("provider stream failed mid-flight: {err}");
                        transcoder.fail_into(&err.to_string(), &mut frames);
                        source_done = true;
                    }
                    None => {
                        transcoder.finish_into(&mut frames);
                        source_done = true;
                    }
                }
                pending.extend(frames);
            }
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
