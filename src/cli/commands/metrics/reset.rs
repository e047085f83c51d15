use std::sync::Arc;

use crate::{
    cli::{
        Command, CommandResult,
        commands::{load_snapshot, save_snapshot},
        types::CommandMetadata,
    },
    services::video::{ErrorMetrics, persistence::StateStore},
};

/// Zeroes the persisted error counters, keeping player metadata.
pub struct ResetCommand {
    store: Arc<dyn StateStore>,
}

impl ResetCommand {
    /// Creates a new ResetCommand for `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl Command for ResetCommand {
    fn execute(&self, _args: &[String]) -> CommandResult {
        let mut snapshot = load_snapshot(self.store.as_ref())?;
        snapshot.error_metrics = ErrorMetrics::default();
        save_snapshot(self.store.as_ref(), &snapshot)?;

        Ok("Error metrics reset".to_string())
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "reset".to_string(),
            description: "Reset persisted error metrics".to_string(),
            category: "metrics".to_string(),
            args: Vec::new(),
            examples: vec!["reelguard metrics reset".to_string()],
        }
    }
}
