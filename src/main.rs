use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use squash::banner::{
    BannerInfo, SessionTally, print_banner, print_session_summary, render_completion,
    render_outcome,
};
use squash::commands::{CommandRegistry, CommandResult, SessionInfo, parse_job};
use squash::config::RunnerConfig;
use squash::engine::Engine;
use squash::engine::process::ProcessEngine;
use squash::events::RunId;
use squash::job::{Job, Operation};
use squash::logging;
use squash::runner::{CompletionQueue, JobRunner};

#[derive(Parser)]
#[command(
    name = "squash",
    version,
    about = "Compress and decompress files through an external engine."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Engine executable (default: `compressor` next to this binary, or $SQUASH_ENGINE)
    #[arg(short, long)]
    engine: Option<PathBuf>,

    /// Directory for request artifacts (default: $SQUASH_ARTIFACT_DIR or the system temp dir)
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Print the outcome as JSON (single-job mode)
    #[arg(long, default_value_t = false)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Compress <input> into <output>
    Compress { input: String, output: String },
    /// Decompress <input> into <output>
    Decompress { input: String, output: String },
}

impl Command {
    fn into_job(self) -> Job {
        match self {
            Command::Compress { input, output } => Job::new(Operation::Compress, input, output),
            Command::Decompress { input, output } => {
                Job::new(Operation::Decompress, input, output)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = RunnerConfig::resolve(cli.engine, cli.artifact_dir)
        .context("failed to resolve configuration")?;
    let engine = Arc::new(ProcessEngine::new(&config.engine_path));
    let (runner, mut queue) = JobRunner::new(engine, config);

    match cli.command {
        Some(command) => run_once(&runner, &mut queue, command.into_job(), cli.json).await,
        None => {
            repl(&runner, &mut queue).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Submit one job, wait for it, print the result.
async fn run_once(
    runner: &JobRunner,
    queue: &mut CompletionQueue,
    job: Job,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    runner.submit(job, move |outcome| {
        let _ = tx.send(outcome);
    });
    queue
        .dispatch_next()
        .await
        .context("runner stopped before reporting")?;
    let outcome = rx.await.context("run finished without an outcome")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.is_success() {
        println!("{}", render_outcome(&outcome));
    } else {
        eprintln!("{}", render_outcome(&outcome));
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Interactive loop. Jobs run in the background; results print as they land.
async fn repl(runner: &JobRunner, queue: &mut CompletionQueue) -> anyhow::Result<()> {
    let config = runner.config().clone();
    let engine_label = runner.engine().describe();
    let engine_found = runner.engine().preflight().is_ok();

    print_banner(&BannerInfo {
        engine: &config.engine_path,
        engine_found,
        artifact_dir: &config.artifact_dir,
    });

    let registry = CommandRegistry::new();
    let tally = Arc::new(Mutex::new(SessionTally::default()));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    loop {
        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            delivered = queue.dispatch_next() => {
                if delivered.is_none() {
                    break;
                }
                prompt()?;
                continue;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }

        let active = runner.active();
        let info = SessionInfo {
            engine: &engine_label,
            engine_found: runner.engine().preflight().is_ok(),
            artifact_dir: &config.artifact_dir,
            active: &active,
            tally: *tally.lock().unwrap(),
        };

        match registry.dispatch(input, &info).await {
            CommandResult::Quit => break,
            CommandResult::Handled => {}
            CommandResult::NotACommand => match parse_job(input) {
                Ok(job) => {
                    let shown = job.clone();
                    let tally = tally.clone();
                    // Set right after submit; callbacks only run at dispatch.
                    let id = Arc::new(OnceLock::new());
                    let id_for_callback = id.clone();
                    let run = runner.submit(job, move |outcome| {
                        tally.lock().unwrap().record(&outcome);
                        let run = id_for_callback.get().copied().unwrap_or(RunId(0));
                        println!("\n{}", render_completion(run, &shown, &outcome));
                    });
                    let _ = id.set(run);
                    println!("  started {run}");
                }
                Err(e) => eprintln!("  {e}"),
            },
        }
        prompt()?;
    }

    queue.dispatch_pending();
    print_session_summary(*tally.lock().unwrap(), runner.in_flight());
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("squash> ");
    io::stdout().flush()
}
