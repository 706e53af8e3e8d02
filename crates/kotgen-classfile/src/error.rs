//! Class-file decoding errors

use thiserror::Error;

/// Errors that can occur while decoding the binary class-file structure
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// Unexpected end of the class-file byte stream
    #[error("unexpected end of class file at offset {0}")]
    UnexpectedEnd(usize),

    /// Invalid magic number
    #[error("invalid class file magic: {0:#010x}")]
    InvalidMagic(u32),

    /// Unknown constant pool tag
    #[error("unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag {
        /// The unrecognized tag byte
        tag: u8,
        /// Offset of the tag in the class file
        offset: usize,
    },

    /// Invalid UTF-8 data in a constant pool entry
    #[error("invalid UTF-8 in constant pool entry at offset {0}")]
    InvalidUtf8(usize),

    /// Constant pool index out of range or pointing at an entry of the wrong kind
    #[error("bad constant pool index {0}")]
    BadConstantIndex(u16),

    /// Unknown element-value tag inside an annotation attribute
    #[error("unknown annotation element tag {tag:?} at offset {offset}")]
    UnknownElementTag {
        /// The unrecognized element-value tag
        tag: char,
        /// Offset of the tag in the attribute
        offset: usize,
    },
}

/// Errors that can occur while parsing a descriptor or generic-signature string
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The signature ended before the grammar was satisfied
    #[error("unexpected end of signature {0:?}")]
    UnexpectedEnd(String),

    /// A character outside the signature grammar was found
    #[error("unexpected character {found:?} at position {position} in signature {signature:?}")]
    UnexpectedChar {
        /// The offending character
        found: char,
        /// Byte position of the character
        position: usize,
        /// The full signature being parsed
        signature: String,
    },
}
