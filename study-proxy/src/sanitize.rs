// SPDX-License-Identifier: MIT
// Even in JSON mode the provider occasionally wraps its answer in markdown fences.

/// Remove one ```` ```json ```` (or bare ```` ``` ````) opening fence and one closing
/// fence around the answer. Anything between them is returned untouched.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}
