use std::sync::Arc;

use crate::{
    cli::{Command, CommandResult, commands::load_snapshot, types::CommandMetadata},
    services::video::persistence::StateStore,
};

/// Prints the persisted error counters.
pub struct ShowCommand {
    store: Arc<dyn StateStore>,
}

impl ShowCommand {
    /// Creates a new ShowCommand reading from `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl Command for ShowCommand {
    fn execute(&self, _args: &[String]) -> CommandResult {
        let metrics = load_snapshot(self.store.as_ref())?.error_metrics;

        Ok([
            format!("disposal errors:    {}", metrics.disposal_errors),
            format!("recovery successes: {}", metrics.recovery_successes),
            format!("recovery failures:  {}", metrics.recovery_failures),
            format!("total errors:       {}", metrics.total_errors),
        ]
        .join("\n"))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "show".to_string(),
            description: "Show persisted error metrics".to_string(),
            category: "metrics".to_string(),
            args: Vec::new(),
            examples: vec!["reelguard metrics show".to_string()],
        }
    }
}
