use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Food post is no longer available")]
    Unavailable,

    #[error("Cannot claim your own post")]
    OwnPost,

    #[error("Not authorized to {0}")]
    Forbidden(&'static str),

    #[error("{0} already registered")]
    Duplicate(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
