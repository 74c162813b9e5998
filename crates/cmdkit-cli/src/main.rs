//! Cmdkit CLI - interactive console sessions from the terminal
//!
//! Usage:
//!   cmdkit -c 'help'           # Execute one console line
//!   cmdkit macros.cmd          # Load a file as a script and run it
//!   cmdkit                     # Interactive REPL

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use cmdkit::{CommandOutcome, Console, OutputKind, OutputSink, Script};

/// Sink that prints script and handler output as it is produced.
struct PrintSink;

impl OutputSink for PrintSink {
    fn add_output(&self, text: &str, kind: OutputKind) {
        match kind {
            OutputKind::Error => eprintln!("{text}"),
            OutputKind::Normal | OutputKind::System => println!("{text}"),
        }
    }
}

/// Cmdkit - console command router with macro scripts
#[derive(Parser, Debug)]
#[command(name = "cmdkit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Execute the given console line
    #[arg(short = 'c')]
    command: Option<String>,

    /// Script file to load and run
    #[arg()]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut console = Console::builder().sink(Arc::new(PrintSink)).build()?;

    if let Some(line) = args.command {
        let outcome = console.execute(&line).await;
        return finish(outcome);
    }

    if let Some(path) = args.script {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read script: {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("script")
            .to_string();
        console
            .engine()
            .store()
            .put(Script::new(&name, content))
            .await;
        let outcome = console.execute(&format!("run {name}")).await;
        return finish(outcome);
    }

    repl(&mut console).await
}

/// Print a one-shot outcome and pick the exit code.
fn finish(outcome: CommandOutcome) -> Result<()> {
    let success = outcome.is_success();
    if let Some(text) = outcome.render() {
        if success {
            println!("{text}");
        } else {
            eprintln!("{text}");
        }
    }
    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Read-eval-print loop over stdin. `exit` or `quit` leaves the session.
async fn repl(console: &mut Console) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }
        if !line.is_empty() {
            let outcome = console.execute(line).await;
            if let Some(text) = outcome.render() {
                if outcome.is_success() {
                    println!("{text}");
                } else {
                    eprintln!("{text}");
                }
            }
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
