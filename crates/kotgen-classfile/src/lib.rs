//! JVM class-file parsing for kotgen
//!
//! This crate decodes compiled class files directly from their binary form:
//! - structural metadata (access flags, method descriptors, annotations)
//! - the optional generic-signature strings attached to classes and methods
//! - the plain descriptor grammar used as a fallback when no signature exists
//!
//! No class is ever loaded or executed; parsing is pure and side-effect-free.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod descriptor;
pub mod error;
pub mod names;
pub mod pool;
pub mod reader;
pub mod signature;

pub use class::{ClassFile, MethodInfo};
pub use descriptor::parse_method_descriptor;
pub use error::{ClassFileError, SignatureError};
pub use names::kotlin_source_name_of;
pub use pool::ConstantPool;
pub use reader::ClassReader;
pub use signature::{
    parse_class_signature, parse_method_signature, ClassSignature, FormalTypeParameter,
    MethodSignature, TypeSignature,
};
