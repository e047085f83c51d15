use std::sync::Arc;

use crate::services::video::persistence::StateStore;

use super::{
    CliError, CommandRegistry,
    formatting::{
        format_category, format_command, format_description, format_header, format_usage,
    },
};

/// High-level service for managing and executing CLI commands.
pub struct CliService {
    registry: CommandRegistry,
}

impl CliService {
    /// Creates a new CLI service with all available commands registered.
    ///
    /// # Arguments
    /// * `store` - Persisted state store the commands inspect
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        let mut registry = CommandRegistry::new(store);
        registry.register_all_commands();

        CliService { registry }
    }

    /// Executes a command by category and name with the provided arguments.
    ///
    /// `help` as category, or an empty command name, renders help text
    /// instead of executing anything.
    ///
    /// # Errors
    /// Returns `CliError::CommandNotFound` if the command doesn't exist in the category.
    /// Other errors come from the command itself.
    pub fn execute_command(
        &self,
        category: &str,
        command_name: &str,
        args: &[String],
    ) -> Result<String, CliError> {
        if category == "help" {
            return Ok(self.help());
        }
        if command_name.is_empty() || command_name == "help" {
            return self.category_help(category);
        }

        self.registry.execute(category, command_name, args)
    }

    /// Lists all available commands organized by category.
    pub fn list_all(&self) -> Vec<(String, Vec<String>)> {
        self.registry.list_commands()
    }

    /// Overview of every category and command.
    pub fn help(&self) -> String {
        let mut output = vec![
            format_header("reelguard - persisted video player state"),
            String::new(),
            format_usage("Usage: reelguard <category> <command> [args...]"),
            String::new(),
        ];

        for (category, commands) in self.list_all() {
            output.push(format_category(&category));
            for command in commands {
                let description = self
                    .registry
                    .metadata(&category, &command)
                    .map(|metadata| metadata.description)
                    .unwrap_or_default();
                output.push(format!(
                    "  {:<12} {}",
                    format_command(&command),
                    format_description(&description)
                ));
            }
        }

        output.join("\n")
    }

    fn category_help(&self, category: &str) -> Result<String, CliError> {
        let (_, commands) = self
            .list_all()
            .into_iter()
            .find(|(name, _)| name == category)
            .ok_or_else(|| {
                CliError::CommandNotFound(format!("Failed to find category '{category}'"))
            })?;

        let mut output = vec![format_header(category)];
        for command in commands {
            let metadata = self.registry.metadata(category, &command)?;
            output.push(format!(
                "  {} {}",
                format_command(&metadata.name),
                format_description(&metadata.description)
            ));
            for example in metadata.examples {
                output.push(format!("      {}", format_usage(&example)));
            }
        }

        Ok(output.join("\n"))
    }
}
