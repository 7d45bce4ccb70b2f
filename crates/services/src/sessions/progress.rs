use quiz_core::model::Session;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
    pub completion_percent: u32,
    pub accuracy_percent: u32,
    pub is_complete: bool,
}

impl QuizProgress {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        let total = session.total_questions();
        let position = if total == 0 {
            0
        } else {
            session.current_index() + 1
        };
        Self {
            position,
            total,
            completion_percent: percent(position, total),
            accuracy_percent: accuracy_percent(session.score(), total),
            is_complete: session.is_completed(),
        }
    }
}

/// `round(score / total * 100)`, 0 for an empty quiz.
#[must_use]
pub fn accuracy_percent(score: u32, total: usize) -> u32 {
    percent(usize::try_from(score).unwrap_or(usize::MAX), total)
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total) as f64;
    let ratio = (part / total as f64 * 100.0).round();
    // Bounded to 0..=100 by the `min` above.
    ratio as u32
}
