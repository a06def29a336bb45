use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct JobsCommand;

#[async_trait]
impl Command for JobsCommand {
    fn name(&self) -> &str {
        "/jobs"
    }

    fn description(&self) -> &str {
        "list runs still in flight"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        if info.active.is_empty() {
            println!("  (no runs in flight)");
        } else {
            for (run, job) in info.active {
                println!("  {run:<5} {job}");
            }
        }
        if info.tally.total() > 0 {
            println!(
                "  finished: {} ok, {} failed",
                info.tally.succeeded, info.tally.failed
            );
        }
        CommandResult::Handled
    }
}
