use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::QuestionDraft;
use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// What the user asked to be quizzed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub subject: String,
    pub count: u32,
}

impl QuizRequest {
    #[must_use]
    pub fn new(subject: impl Into<String>, count: u32) -> Self {
        Self {
            subject: subject.into(),
            count,
        }
    }
}

/// Source of question records for a subject.
///
/// Implementations return drafts as-is; validation happens in the loader so every
/// provider gets the same rules.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch up to `request.count` questions for `request.subject`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the subject is unknown or the source cannot be read.
    async fn fetch(&self, request: &QuizRequest) -> Result<Vec<QuestionDraft>, ProviderError>;
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Serialized question bank: a list of subjects, each with its questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub subjects: Vec<SubjectBank>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectBank {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

impl QuestionBank {
    /// Subject names in bank order.
    #[must_use]
    pub fn subject_names(&self) -> Vec<&str> {
        self.subjects.iter().map(|s| s.name.as_str()).collect()
    }

    fn select(
        &self,
        request: &QuizRequest,
        shuffle: bool,
    ) -> Result<Vec<QuestionDraft>, ProviderError> {
        let subject = self
            .subjects
            .iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(request.subject.trim()))
            .ok_or_else(|| ProviderError::UnknownSubject(request.subject.clone()))?;

        let mut drafts = subject.questions.clone();
        if shuffle {
            drafts.as_mut_slice().shuffle(&mut rng());
        }
        let limit = usize::try_from(request.count).unwrap_or(usize::MAX);
        drafts.truncate(limit);
        Ok(drafts)
    }
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Serves questions from a bank held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionProvider {
    bank: QuestionBank,
    shuffle: bool,
}

impl StaticQuestionProvider {
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            shuffle: false,
        }
    }

    /// Single-subject convenience constructor.
    #[must_use]
    pub fn with_subject(name: impl Into<String>, questions: Vec<QuestionDraft>) -> Self {
        Self::new(QuestionBank {
            subjects: vec![SubjectBank {
                name: name.into(),
                questions,
            }],
        })
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }
}

#[async_trait]
impl QuestionProvider for StaticQuestionProvider {
    async fn fetch(&self, request: &QuizRequest) -> Result<Vec<QuestionDraft>, ProviderError> {
        self.bank.select(request, self.shuffle)
    }
}

//
// ─── JSON FILE ─────────────────────────────────────────────────────────────────
//

/// Serves questions from a JSON question bank on disk.
///
/// The file is read on every fetch, so retrying a failed load picks up a fixed file.
#[derive(Debug, Clone)]
pub struct JsonFileQuestionProvider {
    path: PathBuf,
    shuffle: bool,
}

impl JsonFileQuestionProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Io` or `ProviderError::Parse`.
    pub async fn read_bank(&self) -> Result<QuestionBank, ProviderError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ProviderError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| ProviderError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl QuestionProvider for JsonFileQuestionProvider {
    async fn fetch(&self, request: &QuizRequest) -> Result<Vec<QuestionDraft>, ProviderError> {
        self.read_bank().await?.select(request, self.shuffle)
    }
}
