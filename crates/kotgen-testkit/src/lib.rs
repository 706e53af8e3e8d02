//! Test support for kotgen
//!
//! Synthesizes valid class-file bytes and packs them into JARs or class
//! directories, so integration tests can exercise the extractor against real
//! binary input without compiling Java on the test machine.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod builder;
mod pack;

pub use builder::{ClassFileBuilder, MethodBuilder, ACC_PUBLIC, ACC_STATIC};
pub use pack::{write_class_dir, write_class_jar};
