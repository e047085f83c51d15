use std::sync::Arc;

use crate::{
    cli::{
        Command, CommandResult,
        commands::load_snapshot,
        formatting::{format_playing, format_timestamp, format_warning},
        types::{ArgType, CommandArg, CommandMetadata},
    },
    services::video::persistence::StateStore,
};

/// Lists the persisted metadata of every known player slot.
///
/// ```bash
/// reelguard players list
/// reelguard players list feed-3
/// ```
pub struct ListCommand {
    store: Arc<dyn StateStore>,
}

impl ListCommand {
    /// Creates a new ListCommand reading from `store`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

impl Command for ListCommand {
    fn execute(&self, args: &[String]) -> CommandResult {
        let filter = args.first().map(String::as_str);
        let snapshot = load_snapshot(self.store.as_ref())?;

        let lines: Vec<String> = snapshot
            .players_meta
            .iter()
            .filter(|(id, _)| filter.is_none_or(|prefix| id.as_str().starts_with(prefix)))
            .map(|(id, meta)| {
                let mut line = format!(
                    "{id}: {} recoveries={} last_recovery={}",
                    format_playing(meta.is_playing),
                    meta.recovery_attempts,
                    format_timestamp(meta.last_recovery_time),
                );
                if let Some(error) = &meta.last_error {
                    line.push(' ');
                    line.push_str(&format_warning(&format!(
                        "last_error={} ({:?})",
                        error.code, error.severity
                    )));
                }
                line
            })
            .collect();

        if lines.is_empty() {
            return Ok("No players recorded".to_string());
        }

        Ok(lines.join("\n"))
    }

    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "list".to_string(),
            description: "List persisted player metadata".to_string(),
            category: "players".to_string(),
            args: vec![CommandArg {
                name: "prefix".to_string(),
                description: "Only list ids starting with this prefix".to_string(),
                required: false,
                value_type: ArgType::String,
            }],
            examples: vec![
                "reelguard players list".to_string(),
                "reelguard players list feed-".to_string(),
            ],
        }
    }
}
