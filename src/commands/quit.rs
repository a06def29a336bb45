use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["/q", "quit", "exit"]
    }

    fn description(&self) -> &str {
        "leave squash (running engines are not stopped)"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        if !info.active.is_empty() {
            println!("  {} run(s) still in flight", info.active.len());
        }
        CommandResult::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[tokio::test]
    async fn quits_even_with_idle_session() {
        assert!(matches!(
            QuitCommand.execute(&test_info()).await,
            CommandResult::Quit
        ));
    }

    #[test]
    fn bare_words_quit_too() {
        let aliases = QuitCommand.aliases();
        assert!(aliases.contains(&"quit"));
        assert!(aliases.contains(&"exit"));
    }
}
