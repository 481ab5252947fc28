use crate::protocol::gemini::{GeminiContent, GeminiPart, GeminiRequest};

/// Estimate the number of tokens in `text`.
///
/// Uses a lightweight heuristic (`bytes / 4`) to avoid shipping model BPE
/// tables; the countTokens endpoint is answered locally with this estimate
/// because the upstream has no equivalent.
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(4)
}

/// Estimate the total tokens across a request's text content.
///
/// Sums the system instruction and every text part of every turn; other
/// part kinds contribute nothing.
#[must_use]
pub fn estimate_request_tokens(request: &GeminiRequest) -> u64 {
    let mut total: u64 = 0;
    if let Some(instruction) = &request.system_instruction {
        total += estimate_content_tokens(instruction);
    }
    for content in &request.contents {
        total += estimate_content_tokens(content);
    }
    total
}

fn estimate_content_tokens(content: &GeminiContent) -> u64 {
    content
        .parts
        .iter()
        .map(|part| match part {
            GeminiPart::Text(text) => estimate_tokens(text),
            _ => 0,
        })
        .sum()
}
