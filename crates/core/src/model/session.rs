use std::sync::Arc;

use crate::model::{Question, QuizSettings};

//
// ─── STATUS & ACTIONS ─────────────────────────────────────────────────────────
//

/// Grading state of the active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerStatus {
    /// Not graded yet. Selection is open.
    #[default]
    Idle,
    /// Answered correctly. Terminal for the question.
    Correct,
    /// Last submission was wrong. Locked until `Retry`.
    Wrong,
    /// The countdown ran out. Counts as a mistake; `Retry` or `NextQuestion` move on.
    Expired,
}

impl AnswerStatus {
    /// True when selection and submission are refused.
    #[must_use]
    pub fn is_locked(self) -> bool {
        !matches!(self, AnswerStatus::Idle)
    }
}

/// Every input the session reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    SelectOption(String),
    Submit,
    Retry,
    NextQuestion,
    Reset,
    /// One clock period elapsed for the question at `index`.
    Tick { index: usize },
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// State of one quiz attempt.
///
/// A `Session` is a value: `apply` returns the next state and leaves `self`
/// untouched. Actions that are not valid in the current state return an
/// unchanged copy instead of failing, so callers never have to guard them.
///
/// The question list is shared behind an `Arc` and never changes for the
/// lifetime of the session, `Reset` included.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    questions: Arc<[Question]>,
    settings: QuizSettings,
    current_index: usize,
    selected_answer: Option<String>,
    status: AnswerStatus,
    score: u32,
    incorrect_attempts: u32,
    time_elapsed: u32,
    total_time: u32,
    is_completed: bool,
}

impl Session {
    /// Start a session over `questions`. An empty list gives an unplayable session.
    #[must_use]
    pub fn new(questions: impl Into<Arc<[Question]>>, settings: QuizSettings) -> Self {
        Self {
            questions: questions.into(),
            settings,
            current_index: 0,
            selected_answer: None,
            status: AnswerStatus::Idle,
            score: 0,
            incorrect_attempts: 0,
            time_elapsed: 0,
            total_time: 0,
            is_completed: false,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &Arc<[Question]> {
        &self.questions
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn incorrect_attempts(&self) -> u32 {
        self.incorrect_attempts
    }

    /// Seconds on the current question's clock.
    #[must_use]
    pub fn time_elapsed(&self) -> u32 {
        self.time_elapsed
    }

    /// Seconds across the whole attempt.
    #[must_use]
    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// False when there is nothing to play.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        !self.questions.is_empty()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Seconds left on the countdown, `None` for the count-up clock.
    #[must_use]
    pub fn time_remaining(&self) -> Option<u32> {
        self.settings
            .time_limit_secs()
            .map(|limit| limit.saturating_sub(self.time_elapsed))
    }

    #[must_use]
    pub fn accepts_selection(&self) -> bool {
        self.is_active() && !self.status.is_locked()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.accepts_selection() && self.selected_answer.is_some()
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.is_active() && matches!(self.status, AnswerStatus::Wrong | AnswerStatus::Expired)
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.is_active() && matches!(self.status, AnswerStatus::Correct | AnswerStatus::Expired)
    }

    /// True while the question clock should be running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.is_active() && matches!(self.status, AnswerStatus::Idle | AnswerStatus::Wrong)
    }

    fn is_active(&self) -> bool {
        self.is_playable() && !self.is_completed
    }

    /// Compute the state that follows `action`.
    #[must_use]
    pub fn apply(&self, action: QuizAction) -> Session {
        let mut next = self.clone();
        match action {
            QuizAction::SelectOption(answer) => next.select_option(&answer),
            QuizAction::Submit => next.submit(),
            QuizAction::Retry => next.retry(),
            QuizAction::NextQuestion => next.next_question(),
            QuizAction::Reset => next.reset(),
            QuizAction::Tick { index } => next.tick(index),
        }
        next
    }

    fn select_option(&mut self, answer: &str) {
        if !self.accepts_selection() {
            return;
        }
        let Some(option) = self
            .current_question()
            .and_then(|question| question.find_option(answer))
            .map(str::to_owned)
        else {
            return;
        };
        self.selected_answer = Some(option);
    }

    fn submit(&mut self) {
        if !self.can_submit() {
            return;
        }
        let (Some(question), Some(answer)) = (self.current_question(), self.selected_answer())
        else {
            return;
        };

        if question.is_correct(answer) {
            self.status = AnswerStatus::Correct;
            self.score = self.score.saturating_add(1);
        } else {
            self.status = AnswerStatus::Wrong;
            self.incorrect_attempts = self.incorrect_attempts.saturating_add(1);
        }
    }

    fn retry(&mut self) {
        if !self.can_retry() {
            return;
        }
        self.status = AnswerStatus::Idle;
        self.selected_answer = None;
        self.time_elapsed = 0;
    }

    fn next_question(&mut self) {
        if !self.can_advance() {
            return;
        }
        if self.is_last_question() {
            self.is_completed = true;
            return;
        }
        self.current_index += 1;
        self.clear_question_state();
    }

    fn reset(&mut self) {
        *self = Session::new(Arc::clone(&self.questions), self.settings.clone());
    }

    fn tick(&mut self, index: usize) {
        if index != self.current_index || !self.is_ticking() {
            return;
        }
        self.time_elapsed = self.time_elapsed.saturating_add(1);
        self.total_time = self.total_time.saturating_add(1);

        if self.time_remaining() == Some(0) {
            self.status = AnswerStatus::Expired;
            self.incorrect_attempts = self.incorrect_attempts.saturating_add(1);
        }
    }

    fn clear_question_state(&mut self) {
        self.selected_answer = None;
        self.status = AnswerStatus::Idle;
        self.time_elapsed = 0;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn question(id: &str, options: &[&str], correct: &str) -> Question {
        QuestionDraft {
            id: id.into(),
            question: format!("Question {id}"),
            options: options.iter().map(|s| (*s).to_string()).collect(),
            correct_answer: correct.into(),
            solution: String::new(),
        }
        .validate()
        .unwrap()
    }

    fn two_questions() -> Vec<Question> {
        vec![
            question("q1", &["Paris", "Rome", "Madrid"], "Paris"),
            question("q2", &["6", "7", "8"], "7"),
        ]
    }

    fn run(session: &Session, actions: impl IntoIterator<Item = QuizAction>) -> Session {
        actions
            .into_iter()
            .fold(session.clone(), |state, action| state.apply(action))
    }

    fn select(answer: &str) -> QuizAction {
        QuizAction::SelectOption(answer.into())
    }

    #[test]
    fn scenario_two_questions_with_one_retry() {
        let start = Session::new(two_questions(), QuizSettings::default());

        let s = run(&start, [select("Paris"), QuizAction::Submit]);
        assert_eq!(s.status(), AnswerStatus::Correct);
        assert_eq!(s.score(), 1);

        let s = run(&s, [QuizAction::Tick { index: 0 }, QuizAction::NextQuestion]);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.status(), AnswerStatus::Idle);
        assert_eq!(s.time_elapsed(), 0);

        let s = run(&s, [select("6"), QuizAction::Submit]);
        assert_eq!(s.status(), AnswerStatus::Wrong);
        assert_eq!(s.incorrect_attempts(), 1);

        let s = s.apply(QuizAction::Retry);
        assert_eq!(s.status(), AnswerStatus::Idle);
        assert_eq!(s.selected_answer(), None);

        let s = run(&s, [select("7"), QuizAction::Submit]);
        assert_eq!(s.status(), AnswerStatus::Correct);
        assert_eq!(s.score(), 2);

        let s = s.apply(QuizAction::NextQuestion);
        assert!(s.is_completed());
        assert_eq!(s.score(), 2);
        assert_eq!(s.incorrect_attempts(), 1);
    }

    #[test]
    fn apply_leaves_previous_state_untouched() {
        let start = Session::new(two_questions(), QuizSettings::default());
        let next = start.apply(select("Paris"));
        assert_eq!(start.selected_answer(), None);
        assert_eq!(next.selected_answer(), Some("Paris"));
    }

    #[test]
    fn selection_outside_options_is_ignored() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(&s, [select("Rome"), select("Berlin")]);
        assert_eq!(s.selected_answer(), Some("Rome"));
    }

    #[test]
    fn selection_is_normalized_to_option_text() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = s.apply(select("  Paris "));
        assert_eq!(s.selected_answer(), Some("Paris"));
        let s = s.apply(QuizAction::Submit);
        assert_eq!(s.status(), AnswerStatus::Correct);
    }

    #[test]
    fn submit_without_selection_is_noop() {
        let s = Session::new(two_questions(), QuizSettings::default());
        assert_eq!(s.apply(QuizAction::Submit), s);
    }

    #[test]
    fn correct_is_terminal_and_scores_once() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(
            &s,
            [
                select("Paris"),
                QuizAction::Submit,
                QuizAction::Submit,
                select("Rome"),
                QuizAction::Submit,
                QuizAction::Retry,
            ],
        );
        assert_eq!(s.status(), AnswerStatus::Correct);
        assert_eq!(s.selected_answer(), Some("Paris"));
        assert_eq!(s.score(), 1);
        assert_eq!(s.incorrect_attempts(), 0);
    }

    #[test]
    fn wrong_locks_selection_until_retry() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(&s, [select("Rome"), QuizAction::Submit, select("Paris")]);
        assert_eq!(s.status(), AnswerStatus::Wrong);
        assert_eq!(s.selected_answer(), Some("Rome"));

        let s = run(&s, [QuizAction::Submit]);
        assert_eq!(s.incorrect_attempts(), 1);
    }

    #[test]
    fn each_wrong_submission_counts() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(
            &s,
            [
                select("Rome"),
                QuizAction::Submit,
                QuizAction::Retry,
                select("Madrid"),
                QuizAction::Submit,
            ],
        );
        assert_eq!(s.incorrect_attempts(), 2);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn next_question_requires_grading() {
        let s = Session::new(two_questions(), QuizSettings::default());
        assert_eq!(s.apply(QuizAction::NextQuestion).current_index(), 0);

        let wrong = run(&s, [select("Rome"), QuizAction::Submit, QuizAction::NextQuestion]);
        assert_eq!(wrong.current_index(), 0);
    }

    #[test]
    fn retry_resets_question_clock_only() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(
            &s,
            [
                QuizAction::Tick { index: 0 },
                QuizAction::Tick { index: 0 },
                select("Rome"),
                QuizAction::Submit,
                QuizAction::Tick { index: 0 },
                QuizAction::Retry,
            ],
        );
        assert_eq!(s.time_elapsed(), 0);
        assert_eq!(s.total_time(), 3);
    }

    #[test]
    fn ticks_stop_on_correct_and_ignore_stale_index() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let s = run(&s, [select("Paris"), QuizAction::Submit, QuizAction::Tick { index: 0 }]);
        assert_eq!(s.total_time(), 0);

        let s = run(&s, [QuizAction::NextQuestion, QuizAction::Tick { index: 0 }]);
        assert_eq!(s.time_elapsed(), 0);
        assert_eq!(s.total_time(), 0);

        let s = s.apply(QuizAction::Tick { index: 1 });
        assert_eq!(s.time_elapsed(), 1);
        assert_eq!(s.total_time(), 1);
    }

    #[test]
    fn completed_session_ignores_everything_but_reset() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let done = run(
            &s,
            [
                select("Paris"),
                QuizAction::Submit,
                QuizAction::NextQuestion,
                select("7"),
                QuizAction::Submit,
                QuizAction::NextQuestion,
            ],
        );
        assert!(done.is_completed());
        assert_eq!(done.current_index(), 1);

        let after = run(
            &done,
            [
                QuizAction::Tick { index: 1 },
                QuizAction::NextQuestion,
                select("6"),
                QuizAction::Retry,
            ],
        );
        assert_eq!(after, done);
        assert!(!after.is_ticking());
    }

    #[test]
    fn reset_restores_initial_values_and_keeps_questions() {
        let s = Session::new(two_questions(), QuizSettings::default());
        let played = run(
            &s,
            [
                QuizAction::Tick { index: 0 },
                select("Rome"),
                QuizAction::Submit,
                QuizAction::Retry,
                select("Paris"),
                QuizAction::Submit,
                QuizAction::NextQuestion,
            ],
        );
        let reset = played.apply(QuizAction::Reset);

        assert_eq!(reset, s);
        assert!(Arc::ptr_eq(reset.questions(), s.questions()));
    }

    #[test]
    fn countdown_expiry_counts_as_mistake() {
        let settings = QuizSettings::countdown(2).unwrap();
        let s = Session::new(two_questions(), settings);
        assert_eq!(s.time_remaining(), Some(2));

        let s = run(&s, [QuizAction::Tick { index: 0 }, QuizAction::Tick { index: 0 }]);
        assert_eq!(s.status(), AnswerStatus::Expired);
        assert_eq!(s.time_remaining(), Some(0));
        assert_eq!(s.incorrect_attempts(), 1);
        assert!(!s.is_ticking());

        let frozen = run(&s, [QuizAction::Tick { index: 0 }, select("Paris"), QuizAction::Submit]);
        assert_eq!(frozen, s);

        let retried = s.apply(QuizAction::Retry);
        assert_eq!(retried.time_remaining(), Some(2));
        assert_eq!(retried.status(), AnswerStatus::Idle);

        let advanced = s.apply(QuizAction::NextQuestion);
        assert_eq!(advanced.current_index(), 1);
        assert_eq!(advanced.incorrect_attempts(), 1);
    }

    #[test]
    fn empty_session_is_inert() {
        let s = Session::new(Vec::<Question>::new(), QuizSettings::default());
        assert!(!s.is_playable());
        assert!(s.current_question().is_none());

        let after = run(
            &s,
            [
                select("x"),
                QuizAction::Submit,
                QuizAction::Retry,
                QuizAction::NextQuestion,
                QuizAction::Tick { index: 0 },
                QuizAction::Reset,
            ],
        );
        assert_eq!(after, s);
        assert!(!after.is_completed());
        assert!(!after.is_ticking());
    }
}
