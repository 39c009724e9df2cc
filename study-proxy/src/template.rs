// SPDX-License-Identifier: MIT
//! Instruction template sent ahead of every question.
//!
//! The schema block is the contract the client parses; keep it byte-for-byte in
//! sync with `AnalysisResponse` in the client crate.

/// JSON shape the model must answer with.
pub const RESPONSE_SCHEMA: &str = r#"{
  "prof1": {
    "answer": "The final answer and numeric result only. As short as possible.",
    "casio": "Key presses on a Casio fx-580VN X calculator, if useful."
  },
  "prof2": {
    "explanation": "Short, focused solution steps.",
    "method": "The key formula or a quick trick for this kind of problem."
  },
  "prof3": {
    "quizzes": [
      {
        "question": "Similar multiple-choice question 1",
        "options": ["A...", "B...", "C...", "D..."],
        "answer": "The correct option",
        "explanation": "Quick explanation"
      },
      {
        "question": "Similar multiple-choice question 2",
        "options": ["A...", "B...", "C...", "D..."],
        "answer": "The correct option",
        "explanation": "Quick explanation"
      }
    ]
  },
  "tts_summary": "A one or two sentence summary of the solution, to be read aloud."
}"#;

/// Prompt used when the request carries an image but no text.
pub const DEFAULT_PROMPT: &str = "Solve this problem in detail.";

/// Build the combined instruction: system template followed by the user's text.
pub fn instruction(subject: &str, prompt: Option<&str>, language: &str) -> String {
    let prompt = prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PROMPT);

    format!(
        "You are a homework assistant for the subject: {subject}. \
Solve the problem in the image and/or text and answer using exactly this JSON structure, \
with no extra commentary:\n\n\
{RESPONSE_SCHEMA}\n\n\
Rules:\n\
1. Write every string value in {language}.\n\
2. Use inline LaTeX for mathematical expressions (for example: $x^2$).\n\
3. Every quiz has exactly four options and exactly one of them is the answer.\n\
4. Return ONLY the JSON object, with no characters outside it.\n\
5. No role-play and no greetings.\n\n\
Problem:\n{prompt}"
    )
}
