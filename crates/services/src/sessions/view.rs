use chrono::{DateTime, Utc};
use quiz_core::model::Session;

use super::progress::accuracy_percent;

/// Results of a completed quiz attempt.
///
/// Presentation-agnostic: no pre-formatted strings. Use `format_clock` for
/// `total_time_secs` if the results screen wants `m:ss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    pub total_questions: usize,
    pub score: u32,
    pub incorrect_attempts: u32,
    pub total_time_secs: u32,
    pub accuracy_percent: u32,
}

impl QuizSummary {
    /// Build the summary of a completed session; `None` while it is still running.
    #[must_use]
    pub fn from_session(
        session: &Session,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Option<Self> {
        if !session.is_completed() {
            return None;
        }
        Some(Self {
            started_at,
            completed_at,
            total_questions: session.total_questions(),
            score: session.score(),
            incorrect_attempts: session.incorrect_attempts(),
            total_time_secs: session.total_time(),
            accuracy_percent: accuracy_percent(session.score(), session.total_questions()),
        })
    }
}

/// Formats seconds as `m:ss`, e.g. `65` -> `1:05`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
