//! Error types for the remote feed and the command handlers.
//!
//! `FeedError` is what collaborators (the HTTP client) report. `CommandError`
//! is what a handler reports back to the REPL, which prints it and moves on.

use crate::store::LocalId;

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("rate limited by the remote service")]
    RateLimited,

    #[error("remote item {0} does not exist")]
    RemoteNotFound(u64),

    #[error("remote service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Nothing to post: the text is empty")]
    Empty,

    #[error("Too long: {len} characters (the limit is {max})")]
    TooLong { len: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No item with id {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Already {0}")]
    AlreadyActioned(&'static str),

    #[error("Error: {0}")]
    Feed(#[from] FeedError),
}

impl CommandError {
    pub fn missing(id: LocalId) -> Self {
        Self::NotFound(id.to_string())
    }
}
