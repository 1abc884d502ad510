//! Watch loop wiring
//!
//! Connects the `notify` backend to the scheduler:
//! - raw notifications and backend errors are split onto two channels,
//! - a third channel carries the shutdown signal,
//! - one blocking `select!` multiplexes all three, so shutdown preempts
//!   promptly even while a debounce timer is pending.
//!
//! Watch events are surfaced through a callback, either rendered for
//! humans or emitted as NDJSON for CI.

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{select, unbounded, Receiver};
use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use crate::error::{RewatchError, RewatchResult};
use crate::runner::ShellRunner;
use crate::scheduler::{ChangeEvent, ChangeKind, EventSink, Scheduler, SchedulerConfig};
use crate::watchset::WatchSet;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Files to watch, resolved from the command line
    pub watch_set: WatchSet,
    /// Command to execute on change
    pub command: String,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Started { files: Vec<String>, command: String },
    Changed { path: String },
    Executing,
    CommandExited { code: i32 },
    CommandFailed { message: String },
    WatchError { message: String },
    Rewatched { path: String },
    RewatchFailed { path: String, message: String },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        match self {
            WatchEvent::Started { files, command } => {
                let files = files
                    .iter()
                    .map(|f| format!(r#""{}""#, f.replace('"', "\\\"")))
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    r#"{{"event":"started","files":[{}],"command":"{}"}}"#,
                    files,
                    command.replace('"', "\\\"")
                )
            }
            WatchEvent::Changed { path } => {
                format!(r#"{{"event":"changed","path":"{}"}}"#, path)
            }
            WatchEvent::Executing => r#"{"event":"executing"}"#.to_string(),
            WatchEvent::CommandExited { code } => {
                format!(r#"{{"event":"command_exited","code":{}}}"#, code)
            }
            WatchEvent::CommandFailed { message } => {
                format!(
                    r#"{{"event":"command_failed","message":"{}"}}"#,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::WatchError { message } => {
                format!(
                    r#"{{"event":"watch_error","message":"{}"}}"#,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::Rewatched { path } => {
                format!(r#"{{"event":"rewatched","path":"{}"}}"#, path)
            }
            WatchEvent::RewatchFailed { path, message } => {
                format!(
                    r#"{{"event":"rewatch_failed","path":"{}","message":"{}"}}"#,
                    path,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::Shutdown => r#"{"event":"shutdown"}"#.to_string(),
        }
    }
}

/// Map a notify event kind onto the scheduler's classification.
///
/// `Access(Close(Write))` counts as a write because inotify reports the
/// end of a write that way; metadata-only changes are the chmod-style
/// noise the scheduler filters out.
fn classify(kind: &EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::Create,
        EventKind::Remove(_) => ChangeKind::Remove,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Permission,
        EventKind::Modify(_) => ChangeKind::Write,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::Write,
        _ => ChangeKind::Other,
    }
}

/// Start watching for file changes and re-running the command.
///
/// Blocks until the shutdown channel delivers (or disconnects). The
/// baseline execution happens before the first notification is consumed.
pub fn watch(
    options: WatchOptions,
    shutdown: Receiver<()>,
    on_event: impl Fn(WatchEvent) + Send + Sync + 'static,
) -> RewatchResult<()> {
    let on_event: EventSink = Arc::new(on_event);

    let (event_tx, event_rx) = unbounded();
    let (error_tx, error_rx) = unbounded();

    let watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(err) => {
                let _ = error_tx.send(err);
            }
        },
        Config::default(),
    )?;
    let watcher = Arc::new(Mutex::new(watcher));

    // Register every file; a path that fails to register is warned about
    // and dropped from the set
    let mut watched: Vec<PathBuf> = Vec::new();
    for path in options.watch_set.paths() {
        match watcher.lock().watch(path, RecursiveMode::NonRecursive) {
            Ok(()) => watched.push(path.clone()),
            Err(err) => (on_event)(WatchEvent::WatchError {
                message: format!("cannot watch '{}': {err}", path.display()),
            }),
        }
    }
    if watched.is_empty() {
        return Err(RewatchError::NoWatchableFiles);
    }

    let resub_watcher = Arc::clone(&watcher);
    let scheduler = Scheduler::new(
        SchedulerConfig::default(),
        ShellRunner::new(&options.command),
        // Re-adding an already-watched path is a harmless no-op, so the
        // recreate recovery can fire spuriously without consequence
        move |path: &std::path::Path| {
            resub_watcher
                .lock()
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|err| err.to_string())
        },
        Arc::clone(&on_event),
    );

    (on_event)(WatchEvent::Started {
        files: watched.iter().map(|p| p.display().to_string()).collect(),
        command: options.command.clone(),
    });

    // Baseline run before any notification is processed
    scheduler.run_now();

    loop {
        select! {
            recv(event_rx) -> msg => match msg {
                Ok(event) => {
                    let kind = classify(&event.kind);
                    for path in event.paths {
                        scheduler.arm(ChangeEvent { path, kind });
                    }
                }
                Err(_) => break,
            },
            recv(error_rx) -> msg => match msg {
                Ok(err) => (on_event)(WatchEvent::WatchError {
                    message: err.to_string(),
                }),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }

    (on_event)(WatchEvent::Shutdown);
    scheduler.shutdown();
    Ok(())
}
