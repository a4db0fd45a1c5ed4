use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LocatorError>;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host.json not found under {0}")]
    HostJsonNotFound(PathBuf),

    #[error("git clone of {url} failed: {detail}")]
    CloneFailed { url: String, detail: String },

    #[error("dotnet publish of {project} failed: {detail}")]
    PublishFailed { project: PathBuf, detail: String },
}
