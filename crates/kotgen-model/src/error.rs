//! Type model errors

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the repository, the type provider and the filter
#[derive(Debug, Error)]
pub enum ApiError {
    /// The type provider was used after being closed.
    ///
    /// This always signals a lifecycle bug in the caller and is never
    /// tolerated silently.
    #[error("api type provider is closed")]
    Closed,

    /// The class bytes repository was used after being closed
    #[error("class bytes repository is closed")]
    RepositoryClosed,

    /// An include pattern did not end in `*` or `**`
    #[error("invalid include pattern {0:?} (must end in `*` or `**`)")]
    InvalidPattern(String),

    /// An exclude pattern failed to compile
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The parameter names index could not be read; fatal for the whole run
    #[error("parameter names index {path}: {source}")]
    NamesIndex {
        /// Path of the index file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A class-path archive could not be opened or read
    #[error("class path archive {path}: {source}")]
    Archive {
        /// Path of the archive
        path: PathBuf,
        /// Underlying zip error
        source: zip::result::ZipError,
    },

    /// A member carried a descriptor the grammar does not recognize
    #[error("malformed descriptor {descriptor:?} on {function}")]
    MalformedDescriptor {
        /// Qualified function name
        function: String,
        /// The offending descriptor
        descriptor: String,
    },

    /// Any other I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}
