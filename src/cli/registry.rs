use std::{collections::HashMap, sync::Arc};

use crate::services::video::persistence::StateStore;

use super::{
    CliError, Command,
    commands::{metrics, players, state},
    types::CommandMetadata,
};

/// Registry for CLI commands organized by category.
///
/// ```text
/// registry
/// ├── state
/// │   ├── show
/// │   ├── path
/// │   └── clear
/// ├── metrics
/// │   ├── show
/// │   └── reset
/// └── players
///     └── list
/// ```
pub struct CommandRegistry {
    /// category name -> (command name -> command implementation)
    categories: HashMap<String, HashMap<String, Box<dyn Command>>>,
    store: Arc<dyn StateStore>,
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    ///
    /// Commands must be added with `register_command` or
    /// `register_all_commands`.
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            categories: HashMap::new(),
            store,
        }
    }

    /// Registers a command in the specified category.
    ///
    /// The command's metadata name is its key within the category. A command
    /// with the same name replaces the previous one.
    pub fn register_command(&mut self, category: &str, command: Box<dyn Command>) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(command.metadata().name, command);
    }

    /// Executes a command by category and name with the provided arguments.
    ///
    /// # Errors
    ///
    /// Returns `CliError::CommandNotFound` if the category or command does not
    /// exist, `CliError::InvalidArguments` if the argument count is wrong.
    /// Other errors come from the command itself.
    pub fn execute(
        &self,
        category: &str,
        command_name: &str,
        args: &[String],
    ) -> Result<String, CliError> {
        let found_command = self.find(category, command_name)?;

        Self::validate_args(&found_command.metadata(), args)?;

        found_command.execute(args)
    }

    /// Metadata of a registered command.
    ///
    /// # Errors
    ///
    /// Returns `CliError::CommandNotFound` if the command does not exist.
    pub fn metadata(&self, category: &str, command_name: &str) -> Result<CommandMetadata, CliError> {
        self.find(category, command_name).map(|command| command.metadata())
    }

    fn find(&self, category: &str, command_name: &str) -> Result<&dyn Command, CliError> {
        let found_category = self.categories.get(category).ok_or_else(|| {
            CliError::CommandNotFound(format!("Failed to find category '{category}'"))
        })?;

        found_category
            .get(command_name)
            .map(|command| command.as_ref())
            .ok_or_else(|| {
                CliError::CommandNotFound(format!("Failed to find command '{command_name}'"))
            })
    }

    /// Lists all registered commands organized by category, sorted.
    pub fn list_commands(&self) -> Vec<(String, Vec<String>)> {
        let mut categories: Vec<(String, Vec<String>)> = self
            .categories
            .iter()
            .map(|(category, commands)| {
                let mut command_list: Vec<String> = commands.keys().cloned().collect();
                command_list.sort();

                (category.clone(), command_list)
            })
            .collect();

        categories.sort();

        categories
    }

    fn validate_args(metadata: &CommandMetadata, args: &[String]) -> Result<(), CliError> {
        let required_count = metadata.args.iter().filter(|arg| arg.required).count();
        let total_count = metadata.args.len();

        if args.len() < required_count {
            return Err(CliError::InvalidArguments(format!(
                "Expected at least {} arguments, got {}",
                required_count,
                args.len(),
            )));
        }

        if args.len() > total_count {
            return Err(CliError::InvalidArguments(format!(
                "Expected at most {} arguments, got {}",
                total_count,
                args.len(),
            )));
        }

        Ok(())
    }

    /// Registers all available CLI commands in their respective categories.
    pub fn register_all_commands(&mut self) {
        state::register_commands(self, Arc::clone(&self.store));
        metrics::register_commands(self, Arc::clone(&self.store));
        players::register_commands(self, Arc::clone(&self.store));
    }
}
