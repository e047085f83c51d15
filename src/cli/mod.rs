//! Command-line interface for persisted player state.
//!
//! Provides a hierarchical command system for inspecting and resetting the
//! snapshot written by the video player registry. Commands are organized by
//! category and help text is generated from their metadata.

mod commands;
pub mod formatting;
mod registry;
mod service;
mod types;

pub use registry::CommandRegistry;
pub use service::CliService;
pub use types::{ArgType, CliError, Command, CommandArg, CommandMetadata, CommandResult};

#[cfg(test)]
mod tests;
