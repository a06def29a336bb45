use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct EngineCommand;

#[async_trait]
impl Command for EngineCommand {
    fn name(&self) -> &str {
        "/engine"
    }

    fn description(&self) -> &str {
        "show the engine path and artifact directory"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        let status = if info.engine_found { "found" } else { "missing" };
        println!("  engine     {} ({status})", info.engine);
        println!("  artifacts  {}", info.artifact_dir.display());
        CommandResult::Handled
    }
}
