use std::sync::Arc;

use crate::{
    cli::{
        Command, CommandResult,
        commands::load_snapshot,
        types::{ArgType, CommandArg, CommandMetadata},
    },
    services::video::persistence::StateStore,
};

/// Prints a summary of the persisted snapshot, or the raw JSON.
///
/// ```bash
/// reelguard state show
/// reelguard state show true
/// ```
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
    fn execute(&self, args: &[String]) -> CommandResult {
        let raw = matches!(args.first().map(String::as_str), Some("true" | "raw"));
        let snapshot = load_snapshot(self.store.as_ref())?;

        if raw {
            return Ok(snapshot.encode()?);
        }

        let playing = snapshot
            .players_meta
            .values()
            .filter(|meta| meta.is_playing)
            .count();
        let tab = if snapshot.current_tab.is_empty() {
            "-"
        } else {
            snapshot.current_tab.as_str()
        };

        Ok([
            format!("version: {}", snapshot.version),
            format!("current tab: {tab}"),
            format!("players: {} ({} playing)", snapshot.players_meta.len(), playing),
            format!("total errors: {}", snapshot.error_metrics.total_errors),
        ]
        .join("\n"))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "show".to_string(),
            description: "Show the persisted player state".to_string(),
            category: "state".to_string(),
            args: vec![CommandArg {
                name: "raw".to_string(),
                description: "Print the stored JSON instead of a summary".to_string(),
                required: false,
                value_type: ArgType::Boolean,
            }],
            examples: vec![
                "reelguard state show".to_string(),
                "reelguard state show true".to_string(),
            ],
        }
    }
}
