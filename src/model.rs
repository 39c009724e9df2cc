//! # Data Model
//!
//! Request, response and diary types shared by the client, the session and the CLI.
//!
//! The response types mirror the JSON the proxy's instruction template asks the model
//! for:
//!
//! ```text
//! { "prof1": {"answer", "casio"?},
//!   "prof2": {"explanation", "method"},
//!   "prof3": {"quizzes": [{"question", "options"[4], "answer", "explanation"}]},
//!   "tts_summary" }
//! ```
//!
//! Every member is `#[serde(default)]`: the client does not validate the inner shape,
//! so a partial answer still deserializes and missing parts render as empty.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Academic domain of a question. Only changes the instruction wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Subject {
    #[default]
    #[serde(rename = "Toán học")]
    #[value(name = "math")]
    Math,
    #[serde(rename = "Vật lí")]
    #[value(name = "physics")]
    Physics,
    #[serde(rename = "Hóa học")]
    #[value(name = "chemistry")]
    Chemistry,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Physics, Subject::Chemistry];

    /// Label sent on the wire and stored in the diary.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Toán học",
            Subject::Physics => "Vật lí",
            Subject::Chemistry => "Hóa học",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A question headed for the proxy.
///
/// `image` is a `data:` URL (or bare base64) that has already been through the
/// optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub subject: Subject,
    pub prompt: String,
    pub image: Option<String>,
}

impl AnalysisRequest {
    /// Request typed by the user. Returns `None` when there is nothing to send:
    /// a blank prompt and no image.
    pub fn manual(subject: Subject, prompt: impl Into<String>, image: Option<String>) -> Option<Self> {
        let prompt = prompt.into();
        let image = image.filter(|i| !i.trim().is_empty());
        if prompt.trim().is_empty() && image.is_none() {
            return None;
        }
        Some(Self { subject, prompt, image })
    }

    /// Request fired right after an image arrives. The prompt may be empty.
    pub fn from_image(subject: Subject, prompt: impl Into<String>, image: String) -> Self {
        Self {
            subject,
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// Professor 1: the bare answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuickAnswer {
    #[serde(default)]
    pub answer: String,
    /// Calculator key sequence, when the model offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casio: Option<String>,
}

/// Professor 2: the worked explanation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Walkthrough {
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub method: String,
}

/// Professor 3: practice questions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Practice {
    #[serde(default)]
    pub quizzes: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Index of the designated correct option.
    ///
    /// The model states the answer either as the full option text (`"A. 3"`), as the
    /// option letter (`"A"`, `"A)"`), or as the option text without its letter (`"3"`).
    pub fn correct_option(&self) -> Option<usize> {
        let answer = self.answer.trim();
        if answer.is_empty() {
            return None;
        }

        if let Some(i) = self.options.iter().position(|o| o.trim() == answer) {
            return Some(i);
        }

        if let Some(i) = option_letter(answer).filter(|i| *i < self.options.len()) {
            return Some(i);
        }

        self.options
            .iter()
            .position(|o| strip_option_label(o.trim()) == strip_option_label(answer))
    }
}

/// `"B"`, `"B."`, `"B)"` → 1. Anything longer than a bare label is `None`.
fn option_letter(answer: &str) -> Option<usize> {
    let mut chars = answer.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !('A'..='D').contains(&letter) {
        return None;
    }
    match chars.next() {
        None => Some(letter as usize - 'A' as usize),
        Some('.' | ')' | ':') if chars.as_str().trim().is_empty() => {
            Some(letter as usize - 'A' as usize)
        }
        _ => None,
    }
}

/// `"A. 3"` → `"3"`; text without a label comes back unchanged.
fn strip_option_label(option: &str) -> &str {
    let mut chars = option.char_indices();
    match (chars.next(), chars.next()) {
        (Some((_, l)), Some((i, '.' | ')' | ':'))) if ('A'..='D').contains(&l.to_ascii_uppercase()) => {
            option[i + 1..].trim_start()
        }
        _ => option,
    }
}

/// Structured answer returned by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub prof1: QuickAnswer,
    #[serde(default)]
    pub prof2: Walkthrough,
    #[serde(default)]
    pub prof3: Practice,
    /// One or two sentences meant to be read aloud.
    #[serde(default)]
    pub tts_summary: String,
}

/// One solved question in the diary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub date: DateTime<Local>,
    pub subject: Subject,
    /// Prompt text as the user typed it (may be empty for photo questions)
    #[serde(default)]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub results: AnalysisResponse,
}

impl DiaryEntry {
    pub fn new(subject: Subject, input: impl Into<String>, image: Option<String>, results: AnalysisResponse) -> Self {
        Self {
            date: Local::now(),
            subject,
            input: input.into(),
            image,
            results,
        }
    }
}
