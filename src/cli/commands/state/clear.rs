use std::sync::Arc;

use tracing::info;

use crate::{
    cli::{Command, CommandResult, types::CommandMetadata},
    services::video::persistence::StateStore,
};

/// Deletes the persisted snapshot.
///
/// Clears every player's metadata, including exhausted recovery budgets,
/// and all error metrics.
pub struct ClearCommand {
    store: Arc<dyn StateStore>,
}

impl ClearCommand {
    /// Creates a new ClearCommand for `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl Command for ClearCommand {
    fn execute(&self, _args: &[String]) -> CommandResult {
        self.store.clear()?;
        info!(location = %self.store.location(), "Cleared persisted player state");

        Ok("Persisted player state cleared".to_string())
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "clear".to_string(),
            description: "Delete persisted metadata and metrics".to_string(),
            category: "state".to_string(),
            args: Vec::new(),
            examples: vec!["reelguard state clear".to_string()],
        }
    }
}
