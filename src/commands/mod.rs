//! REPL input handling: `/` commands and job lines.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`], which handles dispatch, alias resolution, and help
//! generation. Anything that is not a command is parsed as a job line
//! with [`parse_job`].

mod engine;
mod help;
mod jobs;
mod quit;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::banner::SessionTally;
use crate::error::JobError;
use crate::events::RunId;
use crate::job::{Job, Operation};

/// Session info available to commands during execution.
pub struct SessionInfo<'a> {
    pub engine: &'a str,
    pub engine_found: bool,
    pub artifact_dir: &'a Path,
    pub active: &'a [(RunId, Job)],
    pub tally: SessionTally,
}

/// What the REPL should do after a command runs.
#[derive(Debug)]
pub enum CommandResult {
    /// Not a command; treat the input as a job line.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Exit the REPL.
    Quit,
}

/// A REPL command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/jobs"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(jobs::JobsCommand),
            Arc::new(engine::EngineCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let cmd = input.trim();

        for command in &self.commands {
            if cmd == command.name() || command.aliases().contains(&cmd) {
                // /help needs the registry itself
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(info).await;
            }
        }

        if cmd.starts_with('/') {
            println!("unknown command: {cmd}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Help text for all registered commands plus the job line syntax.
    pub fn help_text(&self) -> String {
        let mut entries: Vec<(String, &str)> = vec![
            (
                "compress <input> <output>".to_string(),
                "compress a file in the background",
            ),
            (
                "decompress <input> <output>".to_string(),
                "decompress a file in the background",
            ),
        ];
        entries.extend(
            self.commands
                .iter()
                .map(|c| (format_label(c.name(), c.aliases()), c.description())),
        );

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `compress <input> <output>` (shell-style quoting allowed).
pub fn parse_job(line: &str) -> Result<Job, JobError> {
    let words = shell_words::split(line)
        .map_err(|e| JobError::invalid(format!("cannot parse line: {e}")))?;
    match words.as_slice() {
        [op, input, output] => {
            let operation: Operation = op.parse()?;
            Ok(Job::new(operation, input.as_str(), output.as_str()))
        }
        [op, ..] if op.parse::<Operation>().is_ok() => Err(JobError::invalid(format!(
            "usage: {op} <input> <output>"
        ))),
        _ => Err(JobError::invalid(
            "expected: compress|decompress <input> <output>",
        )),
    }
}

fn format_label(name: &str, aliases: &[&str]) -> String {
    if aliases.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, aliases.join(", "))
    }
}
