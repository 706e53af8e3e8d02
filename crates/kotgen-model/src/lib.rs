//! API type model for kotgen
//!
//! This crate turns a class path of JARs and class directories into a
//! navigable, lazily-resolved type graph:
//! - [`ClassBytesRepository`] maps Kotlin source names to raw class bytes
//! - [`ApiTypeProvider`] builds memoized [`ApiType`] / [`ApiFunction`] nodes
//!   over those bytes, on demand
//! - [`ApiSpec`] and [`ApiFilter`] narrow the full graph down to the intended
//!   public API surface
//! - [`ParameterNamesIndex`] supplies original parameter names for generated
//!   declarations
//!
//! The provider owns archive handles for its whole lifetime and must be
//! closed; after close every navigation, lazy or not, fails with
//! [`ApiError::Closed`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod filter;
pub mod names;
pub mod repository;
pub mod spec;

pub use api::{ApiFunction, ApiFunctionParameter, ApiType, ApiTypeProvider, ApiTypeUsage};
pub use error::ApiError;
pub use filter::ApiFilter;
pub use names::ParameterNamesIndex;
pub use repository::{
    class_file_path_candidates_for, source_name_of_class_file_path, ClassBytesRepository,
};
pub use spec::ApiSpec;
