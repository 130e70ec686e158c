//! Output-related errors

use std::fmt;
use std::error::Error;
use std::path::Path;

pub enum OutputError {
    /// A file could not be created: (path, cause)
    Open(String, String),
    /// Writing to an open file failed: (path, cause)
    Write(String, String),
    /// A completed file could not be moved into place: (path, cause)
    Commit(String, String),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputError::Open(s, c) => write!(f, "unable to create '{}': {}", s, c),
            OutputError::Write(s, c) => write!(f, "failed to write to '{}': {}", s, c),
            OutputError::Commit(s, c) => write!(f, "failed to commit '{}': {}", s, c),
        }
    }
}

impl fmt::Debug for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Error for OutputError {}

impl OutputError {
    pub fn open<E: ToString>(path: &Path, cause: E) -> Self {
        Self::Open(path.display().to_string(), cause.to_string())
    }

    pub fn write<E: ToString>(path: &Path, cause: E) -> Self {
        Self::Write(path.display().to_string(), cause.to_string())
    }

    pub fn commit<E: ToString>(path: &Path, cause: E) -> Self {
        Self::Commit(path.display().to_string(), cause.to_string())
    }
}
