//! Rewatch CLI - watch files and re-run a command when they change
//!
//! Usage: rewatch [--json] <path-or-glob>... -- <command>...
//!
//! The file list is resolved once at startup, the command runs once as a
//! baseline, and every settled burst of changes re-runs it. Ctrl+C stops
//! the loop cleanly.

mod cli;

use std::process;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use crossbeam_channel::bounded;

use rewatch::{watch, WatchEvent, WatchOptions, WatchSet};

use crate::cli::Cli;

fn main() -> Result<()> {
    // Argument errors exit 1 (clap's default would be 2); help and
    // version remain exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    let watch_set = match WatchSet::resolve(&cli.paths) {
        Ok(set) => set,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    let command = cli.command.join(" ");

    // Ctrl+C feeds the shutdown channel observed by the watch loop
    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .expect("Error setting Ctrl+C handler");

    let json = cli.json;
    let files_label = watch_set.display_list();
    let command_label = command.clone();

    let options = WatchOptions { watch_set, command };
    watch(options, shutdown_rx, move |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            render(&event, &files_label, &command_label);
        }
    })?;

    Ok(())
}

/// Human-readable rendering of watch events.
///
/// `files` and `command` are captured at startup so per-execution lines
/// can show the full context the way the startup banner does.
fn render(event: &WatchEvent, files: &str, command: &str) {
    match event {
        WatchEvent::Started { files, command } => {
            println!("Watching {} file(s): {}", files.len(), files.join(", "));
            println!("Will execute: {command}");
            println!("Press Ctrl+C to stop.\n");
        }
        WatchEvent::Changed { path } => {
            let now = chrono::Local::now().format("%H:%M:%S");
            println!("[{path}] Change detected at {now}");
        }
        WatchEvent::Executing => {
            println!("[{files}] Executing: {command}");
        }
        WatchEvent::CommandExited { code } => {
            if *code != 0 {
                println!("[{files}] Command exited with code {code}");
            }
            println!();
        }
        WatchEvent::CommandFailed { message } => {
            println!("[{files}] Command error: {message}");
            println!();
        }
        WatchEvent::WatchError { message } => eprintln!("Error: {message}"),
        // Successful re-adds are visible in --json mode only
        WatchEvent::Rewatched { .. } => {}
        WatchEvent::RewatchFailed { path, message } => {
            eprintln!("Warning: could not re-watch '{path}': {message}");
        }
        WatchEvent::Shutdown => println!("\nStopping file watcher..."),
    }
}
