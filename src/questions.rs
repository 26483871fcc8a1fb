use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A single interview prompt
///
/// Questions are identified by their position in the bank; the text itself is
/// immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Ordered, fixed set of prompts consumed once at session start
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Load a bank from a JSON file containing an array of prompt strings
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read question bank: {}", path.display()))?;

        let texts: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse question bank: {}", path.display()))?;

        info!("Loaded {} questions from {}", texts.len(), path.display());

        Ok(Self {
            questions: texts.into_iter().map(Question::new).collect(),
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for QuestionBank {
    /// The built-in practice set used when no question file is configured
    fn default() -> Self {
        Self::new(
            [
                "Please introduce yourself, focusing on your strengths and experience.",
                "Tell us about your understanding of the role you applied for and any related experience.",
                "Describe your most challenging project and how you solved the problems you ran into.",
                "Tell us about a situation where teamwork mattered and the role you played in it.",
                "Where do you see yourself in five years, and what are your career goals?",
            ]
            .into_iter()
            .map(Question::new)
            .collect(),
        )
    }
}
