//! Error types for Rewatch
//!
//! Uses `thiserror` for library errors. Only startup errors live here;
//! runtime problems (watch errors, command failures) are reported through
//! the watch event stream and never terminate the loop.

use thiserror::Error;

/// Result type alias for Rewatch operations
pub type RewatchResult<T> = Result<T, RewatchError>;

/// Main error type for Rewatch operations
#[derive(Error, Debug)]
pub enum RewatchError {
    /// A glob pattern on the command line failed to parse
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Glob expansion and stat filtering left nothing to watch
    #[error("no valid files to watch")]
    NoWatchableFiles,

    /// The file-system notification backend could not be set up
    #[error("failed to initialize file watcher: {0}")]
    Notify(#[from] notify::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_watchable_files() {
        let err = RewatchError::NoWatchableFiles;
        assert_eq!(err.to_string(), "no valid files to watch");
    }

    #[test]
    fn test_error_display_pattern() {
        let source = glob::Pattern::new("[").unwrap_err();
        let err = RewatchError::Pattern {
            pattern: "[".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid glob pattern '['"));
    }
}
