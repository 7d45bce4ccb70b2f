use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id is empty")]
    EmptyId,

    #[error("question {id} has empty prompt text")]
    EmptyPrompt { id: QuestionId },

    #[error("question {id} needs at least two options, got {len}")]
    TooFewOptions { id: QuestionId, len: usize },

    #[error("question {id} has an empty option")]
    EmptyOption { id: QuestionId },

    #[error("question {id} lists option {option:?} more than once")]
    DuplicateOption { id: QuestionId, option: String },

    #[error("question {id} correct answer {answer:?} is not one of its options")]
    UnknownCorrectAnswer { id: QuestionId, answer: String },
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Unvalidated question record, as a question provider hands it over.
///
/// Field names follow the provider's camelCase shape (`correctAnswer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub solution: String,
}

impl QuestionDraft {
    /// Trim and check the draft, producing an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the id or prompt is blank, fewer than two
    /// options are given, an option is blank or repeated, or the correct answer
    /// does not name one of the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = QuestionId::new(self.id.trim());
        if id.is_blank() {
            return Err(QuestionError::EmptyId);
        }

        let prompt = self.question.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt { id });
        }

        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                len: self.options.len(),
            });
        }

        let mut options: Vec<String> = Vec::with_capacity(self.options.len());
        for raw in self.options {
            let option = raw.trim().to_string();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { id });
            }
            if options.contains(&option) {
                return Err(QuestionError::DuplicateOption { id, option });
            }
            options.push(option);
        }

        let correct_answer = self.correct_answer.trim().to_string();
        if !options.contains(&correct_answer) {
            return Err(QuestionError::UnknownCorrectAnswer {
                id,
                answer: correct_answer,
            });
        }

        Ok(Question {
            id,
            prompt,
            options,
            correct_answer,
            solution: self.solution.trim().to_string(),
        })
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// Options are unique after trimming and the correct answer is always one of
/// them. Only `QuestionDraft::validate` constructs this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    solution: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// Looks up the option matching `answer` after trimming.
    #[must_use]
    pub fn find_option(&self, answer: &str) -> Option<&str> {
        let answer = answer.trim();
        self.options
            .iter()
            .map(String::as_str)
            .find(|option| *option == answer)
    }

    /// Grades an answer by trimmed string equality.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.correct_answer.trim()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
