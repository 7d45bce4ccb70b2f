use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{Question, QuizAction, QuizSettings, Session};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::ticker::Ticker;
use super::view::QuizSummary;
use crate::Clock;
use crate::error::ControllerError;

const COMMAND_BUFFER: usize = 32;

pub(crate) enum Command {
    Apply {
        action: QuizAction,
        reply: oneshot::Sender<Session>,
    },
    /// Sent by the ticker of the given generation only.
    Tick { generation: u64, index: usize },
    Shutdown,
}

//
// ─── CONTROLLER HANDLE ─────────────────────────────────────────────────────────
//

/// Drives one quiz attempt.
///
/// The session lives inside a single event-loop task. User actions and clock
/// ticks are queued on the same channel and applied in arrival order, so the
/// session is never mutated concurrently. Each action method resolves to the
/// snapshot produced by that action.
///
/// Must be created inside a tokio runtime. Dropping the controller stops the
/// event loop and the question clock.
pub struct QuizController {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Session>,
    summary: watch::Receiver<Option<QuizSummary>>,
    task: JoinHandle<()>,
}

impl QuizController {
    #[must_use]
    pub fn start(questions: impl Into<Arc<[Question]>>, settings: QuizSettings) -> Self {
        Self::start_with_clock(questions, settings, Clock::system())
    }

    /// Like `start`, stamping start/completion times from `clock`.
    #[must_use]
    pub fn start_with_clock(
        questions: impl Into<Arc<[Question]>>,
        settings: QuizSettings,
        clock: Clock,
    ) -> Self {
        let session = Session::new(questions, settings);
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(session.clone());
        let (summary_tx, summary) = watch::channel(None);

        let event_loop = EventLoop {
            started_at: clock.now(),
            session,
            clock,
            ticker: None,
            generation: 0,
            commands: commands.downgrade(),
            snapshots: snapshot_tx,
            summary: summary_tx,
        };
        let task = tokio::spawn(event_loop.run(inbox));

        Self {
            commands,
            snapshots,
            summary,
            task,
        }
    }

    /// Latest published session state. Does not wait for queued actions.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every state change, ticks included.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.snapshots.clone()
    }

    /// Results of the attempt once it is completed.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        self.summary.borrow().clone()
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn select_option(
        &self,
        answer: impl Into<String>,
    ) -> Result<Session, ControllerError> {
        self.dispatch(QuizAction::SelectOption(answer.into())).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn submit(&self) -> Result<Session, ControllerError> {
        self.dispatch(QuizAction::Submit).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn retry(&self) -> Result<Session, ControllerError> {
        self.dispatch(QuizAction::Retry).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn next_question(&self) -> Result<Session, ControllerError> {
        self.dispatch(QuizAction::NextQuestion).await
    }

    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn reset(&self) -> Result<Session, ControllerError> {
        self.dispatch(QuizAction::Reset).await
    }

    /// Apply any action and wait for the resulting snapshot.
    ///
    /// `QuizAction::Tick` is ignored here; only the controller's own clock ticks.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Closed` if the controller has shut down.
    pub async fn dispatch(&self, action: QuizAction) -> Result<Session, ControllerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Apply { action, reply })
            .await
            .map_err(|_| ControllerError::Closed)?;
        response.await.map_err(|_| ControllerError::Closed)
    }

    /// Stop the event loop. Later actions fail with `ControllerError::Closed`.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//
// ─── EVENT LOOP ────────────────────────────────────────────────────────────────
//

struct EventLoop {
    session: Session,
    clock: Clock,
    started_at: DateTime<Utc>,
    ticker: Option<Ticker>,
    generation: u64,
    commands: mpsc::WeakSender<Command>,
    snapshots: watch::Sender<Session>,
    summary: watch::Sender<Option<QuizSummary>>,
}

impl EventLoop {
    async fn run(mut self, mut inbox: mpsc::Receiver<Command>) {
        if self.session.is_playable() {
            info!(
                questions = self.session.total_questions(),
                "quiz session started"
            );
        }
        self.sync_ticker(false);

        while let Some(command) = inbox.recv().await {
            match command {
                Command::Apply {
                    action: QuizAction::Tick { index },
                    reply,
                } => {
                    debug!(index, "external tick ignored");
                    let _ = reply.send(self.session.clone());
                }
                Command::Apply { action, reply } => {
                    self.apply(action);
                    let _ = reply.send(self.session.clone());
                }
                Command::Tick { generation, index } => {
                    let current = self
                        .ticker
                        .as_ref()
                        .is_some_and(|ticker| ticker.generation() == generation);
                    if current {
                        self.apply(QuizAction::Tick { index });
                    }
                }
                Command::Shutdown => break,
            }
        }

        self.ticker = None;
        debug!("quiz event loop stopped");
    }

    fn apply(&mut self, action: QuizAction) {
        let next = self.session.apply(action.clone());
        // Reset always rewinds, even from a pristine session.
        let rewind = match action {
            QuizAction::Reset => true,
            QuizAction::Retry => next != self.session,
            _ => false,
        };
        if next == self.session && !rewind {
            if !matches!(action, QuizAction::Tick { .. }) {
                debug!(?action, status = ?self.session.status(), "quiz action ignored");
            }
            return;
        }

        let previous = std::mem::replace(&mut self.session, next);
        debug!(
            ?action,
            index = self.session.current_index(),
            status = ?self.session.status(),
            "quiz action applied"
        );

        if matches!(action, QuizAction::Reset) {
            self.started_at = self.clock.now();
            self.summary.send_replace(None);
        }
        if !previous.is_completed() && self.session.is_completed() {
            self.record_completion();
        }

        self.sync_ticker(rewind);
        self.snapshots.send_replace(self.session.clone());
    }

    /// Start, restart or stop the question clock to match the session.
    ///
    /// The clock restarts whenever the question index moves or `rewind` is set
    /// (retry, reset). Each restart gets a new generation, so ticks already
    /// queued by the replaced clock are dropped.
    fn sync_ticker(&mut self, rewind: bool) {
        if !self.session.is_ticking() {
            if self.ticker.take().is_some() {
                debug!(index = self.session.current_index(), "question clock stopped");
            }
            return;
        }

        let restart = rewind
            || self
                .ticker
                .as_ref()
                .is_none_or(|ticker| ticker.index() != self.session.current_index());
        if !restart {
            return;
        }

        let Some(commands) = self.commands.upgrade() else {
            self.ticker = None;
            return;
        };
        let index = self.session.current_index();
        self.generation += 1;
        // Replacing the ticker aborts the previous task.
        self.ticker = Some(Ticker::spawn(
            index,
            self.generation,
            self.session.settings().tick_interval(),
            commands,
        ));
        debug!(index, generation = self.generation, "question clock started");
    }

    fn record_completion(&mut self) {
        let completed_at = self.clock.now();
        let summary = QuizSummary::from_session(&self.session, self.started_at, completed_at);
        if let Some(summary) = &summary {
            info!(
                score = summary.score,
                total = summary.total_questions,
                mistakes = summary.incorrect_attempts,
                seconds = summary.total_time_secs,
                "quiz session completed"
            );
        }
        self.summary.send_replace(summary);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use quiz_core::model::{AnswerStatus, QuestionDraft};
    use quiz_core::time::{fixed_clock, fixed_now};

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

    fn questions() -> Vec<Question> {
        vec![
            question("q1", &["Paris", "Rome"], "Paris"),
            question("q2", &["6", "7"], "7"),
        ]
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn clock_runs_until_correct_and_restarts_on_next_question() {
        let controller = QuizController::start(questions(), QuizSettings::default());

        sleep_ms(3500).await;
        let s = controller.snapshot();
        assert_eq!((s.time_elapsed(), s.total_time()), (3, 3));

        controller.select_option("Paris").await.unwrap();
        let s = controller.submit().await.unwrap();
        assert_eq!(s.status(), AnswerStatus::Correct);

        sleep_ms(5000).await;
        assert_eq!(controller.snapshot().total_time(), 3);

        let s = controller.next_question().await.unwrap();
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.time_elapsed(), 0);

        sleep_ms(2500).await;
        let s = controller.snapshot();
        assert_eq!((s.time_elapsed(), s.total_time()), (2, 5));
    }

    #[tokio::test(start_paused = true)]
    async fn clock_keeps_running_while_wrong_and_restarts_on_retry() {
        let controller = QuizController::start(questions(), QuizSettings::default());

        controller.select_option("Rome").await.unwrap();
        controller.submit().await.unwrap();
        sleep_ms(2500).await;
        let s = controller.snapshot();
        assert_eq!(s.status(), AnswerStatus::Wrong);
        assert_eq!(s.time_elapsed(), 2);

        let s = controller.retry().await.unwrap();
        assert_eq!(s.time_elapsed(), 0);
        assert_eq!(s.selected_answer(), None);

        sleep_ms(1500).await;
        let s = controller.snapshot();
        assert_eq!((s.time_elapsed(), s.total_time()), (1, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_from_a_replaced_clock_are_dropped() {
        let controller = QuizController::start(questions(), QuizSettings::default());

        controller.select_option("Rome").await.unwrap();
        controller.submit().await.unwrap();
        sleep_ms(2000).await;
        let s = controller.retry().await.unwrap();
        assert_eq!(s.time_elapsed(), 0);

        // A tick the first clock queued before it was replaced.
        controller
            .commands
            .send(Command::Tick {
                generation: 1,
                index: 0,
            })
            .await
            .unwrap();
        let s = controller.submit().await.unwrap();
        assert_eq!(s.time_elapsed(), 0);

        sleep_ms(999).await;
        assert_eq!(controller.snapshot().time_elapsed(), 0);
        sleep_ms(2).await;
        assert_eq!(controller.snapshot().time_elapsed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_and_reset_restart_a_clock_already_at_zero() {
        let controller = QuizController::start(questions(), QuizSettings::default());

        sleep_ms(900).await;
        controller.select_option("Rome").await.unwrap();
        let s = controller.submit().await.unwrap();
        assert_eq!((s.status(), s.time_elapsed()), (AnswerStatus::Wrong, 0));
        controller.retry().await.unwrap();

        sleep_ms(200).await;
        assert_eq!(controller.snapshot().time_elapsed(), 0);
        sleep_ms(850).await;
        assert_eq!(controller.snapshot().time_elapsed(), 1);

        let s = controller.reset().await.unwrap();
        assert_eq!(s.time_elapsed(), 0);
        sleep_ms(900).await;
        let s = controller.reset().await.unwrap();
        assert_eq!(s.time_elapsed(), 0);

        sleep_ms(200).await;
        assert_eq!(controller.snapshot().time_elapsed(), 0);
        sleep_ms(850).await;
        assert_eq!(controller.snapshot().time_elapsed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatched_ticks_do_not_move_the_clock() {
        let controller = QuizController::start(questions(), QuizSettings::default());

        for _ in 0..3 {
            let s = controller.dispatch(QuizAction::Tick { index: 0 }).await.unwrap();
            assert_eq!((s.time_elapsed(), s.total_time()), (0, 0));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expires_question_without_submission() {
        let settings = QuizSettings::countdown(2).unwrap();
        let controller = QuizController::start(questions(), settings);

        sleep_ms(5000).await;
        let s = controller.snapshot();
        assert_eq!(s.status(), AnswerStatus::Expired);
        assert_eq!(s.incorrect_attempts(), 1);
        assert_eq!(s.time_elapsed(), 2);
        assert_eq!(s.total_time(), 2);

        let s = controller.next_question().await.unwrap();
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.time_remaining(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_stops_clock_and_publishes_summary() {
        let controller =
            QuizController::start_with_clock(questions(), QuizSettings::default(), fixed_clock());

        sleep_ms(1500).await;
        controller.select_option("Paris").await.unwrap();
        controller.submit().await.unwrap();
        controller.next_question().await.unwrap();
        controller.select_option("7").await.unwrap();
        controller.submit().await.unwrap();
        assert!(controller.summary().is_none());

        let s = controller.next_question().await.unwrap();
        assert!(s.is_completed());

        sleep_ms(10_000).await;
        let s = controller.snapshot();
        assert_eq!(s.total_time(), 1);

        let summary = controller.summary().expect("summary after completion");
        assert_eq!(summary.score, 2);
        assert_eq!(summary.total_questions, 2);
        assert_eq!(summary.accuracy_percent, 100);
        assert_eq!(summary.completed_at, fixed_now());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_summary_and_restarts_clock() {
        let controller = QuizController::start(
            vec![question("q1", &["a", "b"], "a")],
            QuizSettings::default(),
        );

        controller.select_option("a").await.unwrap();
        controller.submit().await.unwrap();
        controller.next_question().await.unwrap();
        assert!(controller.summary().is_some());

        let s = controller.reset().await.unwrap();
        assert!(!s.is_completed());
        assert_eq!(s.score(), 0);
        assert!(controller.summary().is_none());

        sleep_ms(1500).await;
        assert_eq!(controller.snapshot().time_elapsed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_ticks() {
        let controller = QuizController::start(questions(), QuizSettings::default());
        let mut updates = controller.subscribe();

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().time_elapsed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_question_list_is_inert() {
        let controller = QuizController::start(Vec::<Question>::new(), QuizSettings::default());

        let s = controller.select_option("anything").await.unwrap();
        assert!(!s.is_playable());
        let s = controller.submit().await.unwrap();
        assert!(s.current_question().is_none());
        controller.next_question().await.unwrap();
        controller.retry().await.unwrap();

        sleep_ms(3000).await;
        let s = controller.snapshot();
        assert_eq!(s.total_time(), 0);
        assert!(!s.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn actions_after_shutdown_report_closed() {
        let controller = QuizController::start(questions(), QuizSettings::default());
        controller.shutdown().await;
        assert_eq!(controller.submit().await, Err(ControllerError::Closed));
    }
}
