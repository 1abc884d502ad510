//! Rewatch - watch files and re-run a command when they change
//!
//! Rewatch resolves a set of files from command-line patterns, watches
//! them for modification, and re-runs a shell command whenever a burst of
//! changes settles. Rapid-fire saves coalesce into a single execution,
//! executions are spaced by a minimum interval, and files that editors
//! delete-and-recreate on save are re-watched automatically.

pub mod error;
pub mod runner;
pub mod scheduler;
pub mod watcher;
pub mod watchset;

// Re-exports for convenience
pub use error::{RewatchError, RewatchResult};
pub use runner::{RunOutcome, Runner, ShellRunner};
pub use scheduler::{ChangeEvent, ChangeKind, EventSink, Scheduler, SchedulerConfig};
pub use watcher::{watch, WatchEvent, WatchOptions};
pub use watchset::WatchSet;
