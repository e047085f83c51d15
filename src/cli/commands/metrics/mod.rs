//! Error metric commands.
mod reset;
mod show;

use std::sync::Arc;

pub use reset::ResetCommand;
pub use show::ShowCommand;

use crate::{cli::CommandRegistry, services::video::persistence::StateStore};

/// Registers all commands of the "metrics" category.
pub fn register_commands(registry: &mut CommandRegistry, store: Arc<dyn StateStore>) {
    const CATEGORY_NAME: &str = "metrics";

    registry.register_command(CATEGORY_NAME, Box::new(ShowCommand::new(Arc::clone(&store))));
    registry.register_command(CATEGORY_NAME, Box::new(ResetCommand::new(store)));
}
