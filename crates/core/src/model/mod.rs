mod ids;
mod question;
mod session;
mod settings;

pub use ids::QuestionId;
pub use question::{Question, QuestionDraft, QuestionError};
pub use session::{AnswerStatus, QuizAction, Session};
pub use settings::{
    DEFAULT_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS, QuizSettings, QuizSettingsDraft,
    QuizSettingsError,
};
