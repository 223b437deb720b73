//! The global command registry: name/alias to command mapping.
//!
//! Populated by the embedding bot's registration phase, then frozen behind
//! an `Arc` for the router. Lookups during dispatch are plain map reads, no
//! synchronization needed.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::RegistrationError;
use super::Command;

#[derive(Default)]
pub struct CommandRegistry {
    by_name: HashMap<String, Arc<Command>>,
    /// Declaration order, primary entries only. Suggestion candidates and
    /// the help/list queries walk this, not the alias map.
    ordered: Vec<Arc<Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a built command under its name and all aliases. Any
    /// collision rejects the whole command.
    pub fn register(&mut self, command: Command) -> Result<(), RegistrationError> {
        let keys: Vec<String> = std::iter::once(command.metadata.name.clone())
            .chain(command.metadata.aliases.iter().cloned())
            .collect();

        for key in &keys {
            if self.by_name.contains_key(key) {
                return Err(RegistrationError::DuplicateCommand(key.clone()));
            }
        }

        let command = Arc::new(command);
        for key in keys {
            self.by_name.insert(key, command.clone());
        }
        self.ordered.push(command);

        Ok(())
    }

    /// Finds a command by its name or any alias.
    pub fn find_command_by_name(&self, name: &str) -> Option<Arc<Command>> {
        self.by_name.get(name).cloned()
    }

    /// All registered commands in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.ordered.iter()
    }

    /// Primary command names, in declaration order.
    pub fn command_names(&self) -> Vec<&str> {
        self.ordered
            .iter()
            .map(|command| command.metadata.name.as_str())
            .collect()
    }

    /// Full invocation paths, one level of subcommands deep, e.g.
    /// `["tag", "tag create", "tag delete"]`.
    pub fn command_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for command in &self.ordered {
            paths.push(command.metadata.name.clone());
            for subcommand in &command.subcommands {
                paths.push(format!(
                    "{} {}",
                    command.metadata.name, subcommand.metadata.name
                ));
            }
        }
        paths
    }
}
