pub mod request;
pub mod response;

pub use request::{to_openai_request, JSON_OUTPUT_TOOL};
pub use response::to_gemini_response;
