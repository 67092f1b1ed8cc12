//! Prompt normalization

use crate::math::hash::fingerprint;

/// Normalize line endings to `\n` and trim surrounding whitespace
pub fn normalize_prompt(prompt: &str) -> String {
    prompt.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Fingerprint of the normalized prompt, recorded in score reports
pub fn prompt_fingerprint(prompt: &str) -> String {
    fingerprint(normalize_prompt(prompt).as_bytes())
}
