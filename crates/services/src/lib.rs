#![forbid(unsafe_code)]

pub mod error;
pub mod provider;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{ControllerError, LoadFailure, ProviderError};
pub use provider::{
    JsonFileQuestionProvider, QuestionBank, QuestionProvider, QuizRequest,
    StaticQuestionProvider, SubjectBank,
};
pub use sessions::{
    LoadOutcome, QuizController, QuizLoader, QuizProgress, QuizSummary, accuracy_percent,
    format_clock,
};
