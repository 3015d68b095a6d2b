//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::LlmPort;
use crate::stores::GameDirectory;
use crate::use_cases::classify::HeuristicClassifier;
use crate::use_cases::turn::RunTurn;

/// Main application state, passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for use cases.
pub struct UseCases {
    pub turn: Arc<RunTurn>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        let games = Arc::new(GameDirectory::new());
        let classifier = Arc::new(HeuristicClassifier);
        let turn = Arc::new(RunTurn::new(games, llm, classifier));

        Self {
            use_cases: UseCases { turn },
        }
    }
}
