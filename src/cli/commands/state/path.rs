use std::sync::Arc;

use crate::{
    cli::{Command, CommandResult, types::CommandMetadata},
    services::video::persistence::StateStore,
};

/// Prints where the snapshot is stored.
pub struct PathCommand {
    store: Arc<dyn StateStore>,
}

impl PathCommand {
    /// Creates a new PathCommand for `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl Command for PathCommand {
    fn execute(&self, _args: &[String]) -> CommandResult {
        Ok(self.store.location())
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "path".to_string(),
            description: "Print the location of the persisted state".to_string(),
            category: "state".to_string(),
            args: Vec::new(),
            examples: vec!["reelguard state path".to_string()],
        }
    }
}
