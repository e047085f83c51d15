//! Persisted snapshot commands.
mod clear;
mod path;
mod show;

use std::sync::Arc;

pub use clear::ClearCommand;
pub use path::PathCommand;
pub use show::ShowCommand;

use crate::{cli::CommandRegistry, services::video::persistence::StateStore};

/// Registers all commands of the "state" category.
pub fn register_commands(registry: &mut CommandRegistry, store: Arc<dyn StateStore>) {
    const CATEGORY_NAME: &str = "state";

    registry.register_command(CATEGORY_NAME, Box::new(ShowCommand::new(Arc::clone(&store))));
    registry.register_command(CATEGORY_NAME, Box::new(PathCommand::new(Arc::clone(&store))));
    registry.register_command(CATEGORY_NAME, Box::new(ClearCommand::new(store)));
}
