//! Plain-text rendering of the three professor views.
//!
//! Formula text is left as-is (`$...$`); terminals show the LaTeX source.

use std::fmt::Write;

use crate::model::{AnalysisResponse, DiaryEntry, Practice, QuickAnswer, Walkthrough};

/// Which facet of an answer to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProfessorView {
    /// Professor 1: the answer and calculator steps
    #[default]
    #[value(name = "answer")]
    Answer,
    /// Professor 2: explanation and method
    #[value(name = "explain")]
    Explain,
    /// Professor 3: practice quiz
    #[value(name = "practice")]
    Practice,
    /// All three, one after the other
    #[value(name = "all")]
    All,
}

pub fn render(response: &AnalysisResponse, view: ProfessorView) -> String {
    match view {
        ProfessorView::Answer => quick_answer(&response.prof1),
        ProfessorView::Explain => walkthrough(&response.prof2),
        ProfessorView::Practice => practice(&response.prof3),
        ProfessorView::All => {
            let mut out = String::new();
            out.push_str(&quick_answer(&response.prof1));
            out.push('\n');
            out.push_str(&walkthrough(&response.prof2));
            out.push('\n');
            out.push_str(&practice(&response.prof3));
            if !response.tts_summary.trim().is_empty() {
                let _ = writeln!(out, "\nSummary: {}", response.tts_summary.trim());
            }
            out
        }
    }
}

pub fn quick_answer(prof1: &QuickAnswer) -> String {
    let mut out = String::from("== Answer ==\n");
    let _ = writeln!(out, "{}", or_placeholder(&prof1.answer));
    if let Some(casio) = prof1.casio.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(out, "Calculator: {}", casio.trim());
    }
    out
}

pub fn walkthrough(prof2: &Walkthrough) -> String {
    let mut out = String::from("== Explanation ==\n");
    let _ = writeln!(out, "{}", or_placeholder(&prof2.explanation));
    if !prof2.method.trim().is_empty() {
        let _ = writeln!(out, "Method: {}", prof2.method.trim());
    }
    out
}

pub fn practice(prof3: &Practice) -> String {
    let mut out = String::from("== Practice ==\n");
    if prof3.quizzes.is_empty() {
        out.push_str("(no practice questions)\n");
        return out;
    }
    for (n, quiz) in prof3.quizzes.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", n + 1, quiz.question.trim());
        let correct = quiz.correct_option();
        for (i, option) in quiz.options.iter().enumerate() {
            let mark = if correct == Some(i) { '*' } else { ' ' };
            let _ = writeln!(out, "   {} {}", mark, option.trim());
        }
        let _ = writeln!(out, "   Correct: {}. {}", quiz.answer.trim(), quiz.explanation.trim());
    }
    out
}

/// One-line summary used by `diary list`.
pub fn diary_line(index: usize, entry: &DiaryEntry) -> String {
    let question = if entry.input.trim().is_empty() {
        if entry.image.is_some() { "(photo)" } else { "(empty)" }
    } else {
        entry.input.trim()
    };
    let question: String = if question.chars().count() > 48 {
        question.chars().take(47).chain(std::iter::once('…')).collect()
    } else {
        question.to_string()
    };
    format!(
        "{:>2}  {}  {:<8}  {}",
        index,
        entry.date.format("%Y-%m-%d %H:%M"),
        entry.subject.label(),
        question
    )
}

fn or_placeholder(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() { "(no content)" } else { text }
}
