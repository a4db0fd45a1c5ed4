use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraverseError>;

#[derive(Error, Debug)]
pub enum TraverseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Locator error: {0}")]
    Locator(#[from] funcgraph_locator::LocatorError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
