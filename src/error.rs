//! Error type shared by the command line, configuration and TUI layers.
//!
//! Store mutations never fail: a missing id is a no-op. Errors come from
//! resolving user input, validating forms, reading settings and terminal I/O.

use std::path::PathBuf;

use crate::task::TaskId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no task found matching '{0}'")]
    TaskNotFound(String),

    #[error("multiple tasks named '{identifier}' (ids {}); use the id instead", format_ids(.matches))]
    AmbiguousTask {
        identifier: String,
        matches: Vec<TaskId>,
    },

    #[error("unknown project '{0}'")]
    UnknownProject(String),

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid parent: {0}")]
    InvalidParent(String),

    #[error("invalid story points '{0}'")]
    InvalidStoryPoints(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_message_lists_ids() {
        let err = Error::AmbiguousTask {
            identifier: "Setup".into(),
            matches: vec![3, 9],
        };
        assert_eq!(
            err.to_string(),
            "multiple tasks named 'Setup' (ids 3, 9); use the id instead"
        );
    }
}
