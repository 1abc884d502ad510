//! Event coalescing and execution scheduling
//!
//! Turns the raw change-notification stream into debounced, rate-limited
//! command executions:
//!
//! - Arming a timer while one is pending supersedes it, so a burst of
//!   rapid events produces one firing, one debounce window after the last
//!   event in the burst.
//! - A firing that lands inside the minimum inter-execution interval is
//!   dropped outright. Nothing is re-armed; the next run needs a fresh
//!   change event.
//! - A firing triggered by a remove schedules a delayed re-subscription,
//!   which recovers files that editors replace by delete-and-rewrite.
//!
//! All shared mutable state (the pending-timer generation, the timestamp
//! of the last execution, the re-subscription task handle) lives behind
//! one mutex. Both the arming path and the timer-fire path take it before
//! deciding anything, which closes the race between an event cancelling a
//! timer and that same timer starting its fire-time decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::runner::{RunOutcome, Runner};
use crate::watcher::WatchEvent;

/// Shared callback for emitting watch events from any thread.
pub type EventSink = Arc<dyn Fn(WatchEvent) + Send + Sync>;

/// Classified change notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Write,
    Create,
    Remove,
    Rename,
    /// Permission/metadata-only change. Filtered: never arms the timer.
    Permission,
    Other,
}

/// A single change notification, as consumed by the scheduler.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Timing policy for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Quiet time required before a burst counts as settled.
    pub debounce: Duration,
    /// Minimum spacing between command executions.
    pub min_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            min_interval: Duration::from_millis(500),
        }
    }
}

struct State {
    /// Identifies the currently armed timer. A timer thread whose
    /// generation no longer matches was superseded and must not fire.
    generation: u64,
    /// Completion time of the most recent execution attempt.
    last_run: Option<Instant>,
    /// Most recently spawned re-subscription task, so shutdown can join it.
    resub: Option<JoinHandle<()>>,
}

struct Shared<R> {
    config: SchedulerConfig,
    runner: R,
    resubscribe: Box<dyn Fn(&Path) -> Result<(), String> + Send + Sync>,
    on_event: EventSink,
    state: Mutex<State>,
}

/// Single owner of the debounce/rate-limit decision state.
///
/// `arm` is the only public mutation path; the timer-fire decision is
/// internal and serialized against it.
pub struct Scheduler<R: Runner + 'static> {
    shared: Arc<Shared<R>>,
}

impl<R: Runner + 'static> Scheduler<R> {
    pub fn new(
        config: SchedulerConfig,
        runner: R,
        resubscribe: impl Fn(&Path) -> Result<(), String> + Send + Sync + 'static,
        on_event: EventSink,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                runner,
                resubscribe: Box::new(resubscribe),
                on_event,
                state: Mutex::new(State {
                    generation: 0,
                    last_run: None,
                    resub: None,
                }),
            }),
        }
    }

    /// Arm (or re-arm) the debounce timer for a change event.
    ///
    /// Permission-only events are discarded without touching timer state.
    pub fn arm(&self, event: ChangeEvent) {
        if event.kind == ChangeKind::Permission {
            return;
        }

        let generation = {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            state.generation
        };

        let shared = Arc::clone(&self.shared);
        thread::spawn(move || {
            thread::sleep(shared.config.debounce);
            Shared::on_fire(&shared, generation, event);
        });
    }

    /// Execute the command unconditionally and stamp the execution gate.
    /// Used for the baseline run at startup.
    pub fn run_now(&self) {
        let mut state = self.shared.state.lock();
        self.shared.execute(&mut state);
    }

    /// Join a pending re-subscription task, if any.
    ///
    /// Pending debounce timers are left to fire stale; with the loop gone
    /// their firing has no observable effect.
    pub fn shutdown(&self) {
        let pending = self.shared.state.lock().resub.take();
        if let Some(handle) = pending {
            let _ = handle.join();
        }
    }
}

impl<R: Runner + 'static> Shared<R> {
    /// Timer-fire decision. Runs on the timer thread.
    fn on_fire(shared: &Arc<Self>, generation: u64, event: ChangeEvent) {
        let mut state = shared.state.lock();

        // A newer event re-armed the timer while this thread slept.
        if state.generation != generation {
            return;
        }

        // Rate limit: drop the settled burst, arm nothing.
        if let Some(last_run) = state.last_run {
            if last_run.elapsed() < shared.config.min_interval {
                return;
            }
        }

        (shared.on_event)(WatchEvent::Changed {
            path: basename(&event.path),
        });
        shared.execute(&mut state);

        if event.kind == ChangeKind::Remove {
            Shared::schedule_resubscribe(shared, &mut state, event.path);
        }
    }

    /// Run the command while holding the state lock, then stamp the gate
    /// with the completion time. Holding the lock blocks re-arming for the
    /// duration, so executions never overlap.
    fn execute(&self, state: &mut State) {
        (self.on_event)(WatchEvent::Executing);
        match self.runner.run() {
            RunOutcome::Exited(code) => (self.on_event)(WatchEvent::CommandExited { code }),
            RunOutcome::Failed(message) => (self.on_event)(WatchEvent::CommandFailed { message }),
        }
        state.last_run = Some(Instant::now());
    }

    /// Best-effort re-add of a removed path, one debounce window from now.
    /// The file may have been deleted for good, in which case this reports
    /// and gives up; membership of the watch set is unchanged either way.
    fn schedule_resubscribe(shared: &Arc<Self>, state: &mut State, path: PathBuf) {
        let shared = Arc::clone(shared);
        let handle = thread::spawn(move || {
            thread::sleep(shared.config.debounce);
            let display = path.display().to_string();
            if !path.exists() {
                (shared.on_event)(WatchEvent::RewatchFailed {
                    path: display,
                    message: "file has not reappeared".to_string(),
                });
                return;
            }
            match (shared.resubscribe)(&path) {
                Ok(()) => (shared.on_event)(WatchEvent::Rewatched { path: display }),
                Err(message) => {
                    (shared.on_event)(WatchEvent::RewatchFailed {
                        path: display,
                        message,
                    });
                }
            }
        });
        // Only the latest task is tracked; earlier ones are idempotent and
        // bounded by one debounce window.
        state.resub = Some(handle);
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
