use std::sync::Arc;

use quiz_core::model::{Question, QuizSettings};
use tracing::{info, warn};

use super::controller::QuizController;
use crate::Clock;
use crate::error::LoadFailure;
use crate::provider::{QuestionProvider, QuizRequest};

/// Result of trying to start a quiz.
pub enum LoadOutcome {
    Ready(QuizController),
    /// Nothing playable came back. The UI shows one "failed to load" state with a
    /// retry affordance whatever the cause; calling `load` again is the retry.
    Failed(LoadFailure),
}

impl LoadOutcome {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }

    #[must_use]
    pub fn into_controller(self) -> Option<QuizController> {
        match self {
            LoadOutcome::Ready(controller) => Some(controller),
            LoadOutcome::Failed(_) => None,
        }
    }
}

/// Orchestrates fetching questions and starting a controller over them.
#[derive(Clone)]
pub struct QuizLoader {
    clock: Clock,
    provider: Arc<dyn QuestionProvider>,
    settings: QuizSettings,
}

impl QuizLoader {
    #[must_use]
    pub fn new(provider: Arc<dyn QuestionProvider>, settings: QuizSettings) -> Self {
        Self {
            clock: Clock::system(),
            provider,
            settings,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Fetch and validate questions, then start a controller.
    ///
    /// Drafts that fail validation are skipped. Must be called inside a tokio runtime.
    pub async fn load(&self, request: &QuizRequest) -> LoadOutcome {
        let drafts = match self.provider.fetch(request).await {
            Ok(drafts) => drafts,
            Err(err) => {
                warn!(subject = %request.subject, error = %err, "question provider failed");
                return LoadOutcome::Failed(err.into());
            }
        };

        let fetched = drafts.len();
        let questions: Vec<Question> = drafts
            .into_iter()
            .filter_map(|draft| match draft.validate() {
                Ok(question) => Some(question),
                Err(err) => {
                    warn!(error = %err, "skipping invalid question");
                    None
                }
            })
            .collect();

        if questions.is_empty() {
            warn!(subject = %request.subject, fetched, "no playable questions");
            return LoadOutcome::Failed(LoadFailure::Empty);
        }

        info!(
            subject = %request.subject,
            requested = request.count,
            loaded = questions.len(),
            "quiz loaded"
        );
        LoadOutcome::Ready(QuizController::start_with_clock(
            questions,
            self.settings.clone(),
            self.clock,
        ))
    }
}
