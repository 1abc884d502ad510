use clap::Parser;

/// Rewatch - re-run a command when watched files change
#[derive(Parser, Debug)]
#[command(name = "rewatch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Example: rewatch main.c utils.c -- 'make'\nExample: rewatch '*.go' -- go build")]
pub struct Cli {
    /// Output NDJSON events for CI
    #[arg(long)]
    pub json: bool,

    /// Files or glob patterns to watch
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,

    /// Command to execute, given after `--`
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
