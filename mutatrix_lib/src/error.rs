//! The `error` module contains `MutatrixError`, the error enumeration used to communicate
//! library errors.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, MutatrixError>;

/// The list of errors that the library can generate.
#[derive(Error, Debug)]
pub enum MutatrixError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    /// An error indicating that a source file could not be parsed as Rust.
    #[error("could not parse {path:?}: {source}")]
    Parse { path: PathBuf, source: syn::Error },

    /// An error indicating that JSON serialization of the report failed.
    #[error("JSON error occurred: {0}")]
    JSON(#[from] serde_json::Error),

    /// An error indicating that a YAML configuration file could not be read.
    #[error("YAML error occurred: {0}")]
    YAML(#[from] serde_yaml::Error),

    /// An error indicating that a mutator name was registered twice.
    #[error("mutator {0} already registered")]
    DuplicateMutator(String),

    /// An error indicating that a requested mutator name is not registered.
    #[error("unknown mutator: {0}")]
    UnknownMutator(String),

    /// An error indicating that a blacklist file contains a malformed entry.
    #[error("{0:?} is not a 32 character hex checksum")]
    InvalidChecksum(String),

    /// An error indicating that a function match pattern is not a valid regex.
    #[error("match regex is not valid: {0}")]
    InvalidMatchPattern(#[from] regex::Error),

    /// An error indicating that an operator asked for a mutation variant it never proposed.
    #[error("mutator {0} has no mutation {1} at the requested node")]
    NoSuchMutation(String, usize),

    /// An error indicating that reverting a mutation did not restore the original tree.
    #[error("mutator {0} did not restore the tree to its original form")]
    RevertMismatch(String),

    /// An error indicating that the test command could not be started at all.
    #[error("could not start test command {command:?}: {source}")]
    ExecStart {
        command: String,
        source: std::io::Error,
    },

    /// An error indicating that the original source file could not be put back in place
    /// after running the tests for a mutant.
    #[error("could not restore original file {path:?}: {reason}; the working tree is inconsistent")]
    RestoreFailed { path: PathBuf, reason: String },
}

impl MutatrixError {
    /// Wrap a `syn` parse error together with the file it came from.
    pub fn parse(path: &std::path::Path, source: syn::Error) -> MutatrixError {
        MutatrixError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}
