use thiserror::Error;

use crate::node::{NodeKey, SelectionKey};

/// Errors originating from the `cascade-select` core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("options tree must contain at least one node")]
    EmptyTree,

    #[error(
        "options tree is uneven: leaf {label:?} sits at level {found}, expected level {expected}"
    )]
    UnevenDepth {
        expected: usize,
        found: usize,
        label: String,
    },

    #[error("options tree depth {depth} exceeds the configured maximum of {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("node {label:?} has no {key} to select by")]
    MissingKey { key: SelectionKey, label: String },

    #[error("sibling {key} {value} is used by more than one node")]
    DuplicateKey { key: SelectionKey, value: NodeKey },

    #[error("level {level} is outside the tree depth of {depth}")]
    LevelOutOfRange { level: usize, depth: usize },

    #[error("level {requested} is not the active level {active}")]
    LevelMismatch { requested: usize, active: usize },

    #[error("choice {index} is not available on level {level}")]
    NotAChoice { level: usize, index: usize },

    #[error("no choice on level {level} is addressed by {key}")]
    UnknownKey { level: usize, key: NodeKey },

    #[error("no search is in progress")]
    NotSearching,

    #[error("search result {index} does not exist")]
    NoSuchResult { index: usize },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
