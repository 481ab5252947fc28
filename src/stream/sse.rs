//! Line-level plumbing for `data:`-framed event streams.
//!
//! The provider streams one JSON event per `data:` line; frames are
//! separated by blank lines which carry no information of their own, so the
//! unit of work here is the complete line, not the SSE dispatch block.

use memchr::memchr_iter;

/// Incremental splitter for a byte stream into complete text lines.
///
/// Bytes arrive at arbitrary boundaries: a multi-byte UTF-8 sequence split
/// across reads is held back and prefixed onto the next chunk, and the
/// trailing incomplete line stays buffered until its newline arrives.
pub struct SseLineBuffer {
    buffer: String,
    utf8_tail: Vec<u8>,
}

impl SseLineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            utf8_tail: Vec::new(),
        }
    }

    /// Feed raw bytes and append every completed line (newline stripped,
    /// trailing `\r` removed) to `out`.
    pub fn feed_into(&mut self, chunk: &[u8], out: &mut Vec<String>) {
        self.decode_chunk(chunk);

        let mut consumed = 0usize;
        {
            let bytes = self.buffer.as_bytes();
            let mut line_start = 0usize;
            for rel in memchr_iter(b'\n', bytes) {
                let mut line = &self.buffer[line_start..rel];
                if let Some(stripped) = line.strip_suffix('\r') {
                    line = stripped;
                }
                out.push(line.to_string());
                line_start = rel + 1;
                consumed = line_start;
            }
        }
        if consumed == self.buffer.len() {
            self.buffer.clear();
        } else if consumed > 0 {
            self.buffer.drain(..consumed);
        }
    }

    fn decode_chunk(&mut self, chunk: &[u8]) {
        if self.utf8_tail.is_empty() {
            match std::str::from_utf8(chunk) {
                Ok(text) => self.buffer.push_str(text),
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
                    let text = unsafe { std::str::from_utf8_unchecked(&chunk[..valid_up_to]) };
                    self.buffer.push_str(text);
                    self.utf8_tail.extend_from_slice(&chunk[valid_up_to..]);
                }
            }
        } else {
            self.utf8_tail.extend_from_slice(chunk);
            match std::str::from_utf8(&self.utf8_tail) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.utf8_tail.clear();
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    // Safety: valid_up_to is guaranteed to be a valid UTF-8 boundary.
                    let text =
                        unsafe { std::str::from_utf8_unchecked(&self.utf8_tail[..valid_up_to]) };
                    self.buffer.push_str(text);
                    if valid_up_to > 0 {
                        let remain = self.utf8_tail.len() - valid_up_to;
                        self.utf8_tail.copy_within(valid_up_to.., 0);
                        self.utf8_tail.truncate(remain);
                    }
                }
            }
        }
    }
}

impl Default for SseLineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Extract the payload of an SSE `data:` line.
///
/// Returns `None` for blank lines, comments, and any other field; only
/// `data:` lines are actionable.
#[must_use]
pub fn data_payload(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }
    let payload = trimmed.strip_prefix("data:")?;
    Some(payload.strip_prefix(' ').unwrap_or(payload))
}

/// Check whether a data payload is the stream-terminal sentinel.
#[must_use]
pub fn is_done_payload(payload: &str) -> bool {
    payload.trim() == "[DONE]"
}

/// Frame a JSON payload as one complete SSE event, terminator included.
#[must_use]
pub fn data_frame(json: &str) -> String {
    let mut out = String::with_capacity(10 + json.len());
    out.push_str("data: ");
    out.push_str(json);
    out.push_str("\n\n");
    out
}

const DONE_FRAME: &str = "data: [DONE]\n\n";

/// The terminal frame closing a client-side stream.
#[must_use]
pub fn done_frame() -> String {
    DONE_FRAME.to_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
