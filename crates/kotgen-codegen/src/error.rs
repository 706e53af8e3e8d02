//! Code generation errors

use kotgen_model::ApiError;
use thiserror::Error;

/// Errors raised by the generation entry point
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Type model navigation failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Writing the output file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
