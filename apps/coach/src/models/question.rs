use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A multiple-choice question. Immutable once constructed; `new` enforces
/// at least two options and an in-range correct index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, AppError> {
        let prompt = prompt.into();
        if options.len() < 2 {
            return Err(AppError::Validation(format!(
                "Question '{prompt}' needs at least two options"
            )));
        }
        if correct_index >= options.len() {
            return Err(AppError::Validation(format!(
                "Question '{prompt}' has correct index {correct_index} out of range"
            )));
        }
        Ok(Self {
            prompt,
            options,
            correct_index,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[cfg(test)]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}

/// A behavioral interview prompt from the "common/HR" pool.
///
/// `keywords` are the points a strong answer touches; they are shown as
/// preparation hints and never used for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehavioralPrompt {
    prompt: String,
    keywords: Vec<String>,
}

impl BehavioralPrompt {
    pub fn new(prompt: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            keywords,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
