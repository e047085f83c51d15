//! Per-player metadata commands.
mod list;

use std::sync::Arc;

pub use list::ListCommand;

use crate::{cli::CommandRegistry, services::video::persistence::StateStore};

/// Registers all commands of the "players" category.
pub fn register_commands(registry: &mut CommandRegistry, store: Arc<dyn StateStore>) {
    registry.register_command("players", Box::new(ListCommand::new(store)));
}
