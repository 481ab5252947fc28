pub mod sse;
pub mod transcoder;

pub use sse::SseLineBuffer;
pub use transcoder::{transcode_stream, StreamTranscoder};
