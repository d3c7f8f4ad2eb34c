use std::io;
use std::path::Path;

use thiserror::Error;

use crate::utils::path_must_str;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    IO(io::Error),

    #[error("failed to get basedirs")]
    NoBaseDirs,

    #[error("consent store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("generic error: {0}")]
    Generic(String),

    #[error("invalid config {0}: {1}")]
    InvalidConfig(String, String),

    #[error("file {0} doesn't exist")]
    MissingFile(String),
}

impl Error {
    pub fn new_cfg<S: ToString + ?Sized>(path: &Path, s: &S) -> Self {
        Self::InvalidConfig(path_must_str(path).into(), s.to_string())
    }

    pub fn new_store<S: ToString + ?Sized>(s: &S) -> Self {
        Self::StoreUnavailable(s.to_string())
    }

    /// Whether this error came from the durable consent store
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::IO(err)
    }
}
