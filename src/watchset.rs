//! Resolution of command-line patterns into the set of watched files
//!
//! Patterns are expanded with `glob`; a pattern that matches nothing is
//! taken as a literal file name. Files that fail to stat are warned about
//! on stderr and excluded. An empty result is a startup error.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::error::{RewatchError, RewatchResult};

/// The ordered, de-duplicated set of files being watched.
///
/// Resolved once at startup. Membership never changes afterwards; a file
/// that is removed and recreated keeps its slot and only has its watch
/// subscription re-established.
#[derive(Debug, Clone)]
pub struct WatchSet {
    paths: Vec<PathBuf>,
}

impl WatchSet {
    /// Expand patterns into watchable files.
    ///
    /// A syntactically invalid pattern is fatal. A valid pattern with no
    /// matches falls back to the literal file name, so `rewatch notes.txt`
    /// works without shell-style globbing.
    pub fn resolve(patterns: &[String]) -> RewatchResult<Self> {
        let mut paths = Vec::new();
        let mut seen = HashSet::new();

        for pattern in patterns {
            let matches: Vec<PathBuf> = glob::glob(pattern)
                .map_err(|source| RewatchError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(err) => {
                        eprintln!("Warning: {err}");
                        None
                    }
                })
                .collect();

            let candidates = if matches.is_empty() {
                // Not a glob pattern (or nothing matched): use as-is
                vec![PathBuf::from(pattern)]
            } else {
                matches
            };

            for path in candidates {
                match fs::metadata(&path) {
                    Ok(_) => {
                        if seen.insert(path.clone()) {
                            paths.push(path);
                        }
                    }
                    Err(err) => {
                        eprintln!("Warning: Cannot stat file '{}': {err}", path.display());
                    }
                }
            }
        }

        if paths.is_empty() {
            return Err(RewatchError::NoWatchableFiles);
        }

        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Comma-separated file list for banner and log lines.
    pub fn display_list(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
