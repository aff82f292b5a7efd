use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// The query was superseded or its caller gave up. Not a failure:
    /// results streamed before the signal remain valid.
    #[error("search cancelled")]
    Cancelled,

    #[error("invalid search configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
