mod controller;
mod progress;
mod ticker;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{ControllerError, LoadFailure};
pub use controller::QuizController;
pub use progress::{QuizProgress, accuracy_percent};
pub use view::{QuizSummary, format_clock};
pub use workflow::{LoadOutcome, QuizLoader};
