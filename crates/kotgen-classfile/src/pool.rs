//! JVM constant pool decoding
//!
//! Only `Utf8` and `Class` payloads are retained; every other entry kind is
//! decoded just far enough to keep the remaining indices valid. `Long` and
//! `Double` entries occupy two pool slots.

use crate::error::ClassFileError;
use crate::reader::ClassReader;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// A decoded constant pool slot
#[derive(Debug, Clone)]
enum Slot {
    /// A UTF-8 string entry
    Utf8(String),
    /// A class reference holding the index of its name entry
    Class(u16),
    /// Any other entry kind, kept only to preserve indexing
    Other,
    /// The phantom second slot of a Long or Double entry
    Empty,
}

/// The constant pool of a single class file
#[derive(Debug, Clone)]
pub struct ConstantPool {
    // Slot 0 is unused by the format; entries[i - 1] is pool index i.
    entries: Vec<Slot>,
}

impl ConstantPool {
    /// Decode the constant pool from the reader, positioned at the pool count
    pub fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.read_u16()?;
        let mut entries = Vec::with_capacity(count.saturating_sub(1) as usize);
        let mut index = 1;
        while index < count {
            let offset = reader.position();
            let tag = reader.read_u8()?;
            let slot = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u16()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    let text = std::str::from_utf8(bytes)
                        .map_err(|_| ClassFileError::InvalidUtf8(offset))?;
                    Slot::Utf8(text.to_string())
                }
                TAG_CLASS => Slot::Class(reader.read_u16()?),
                TAG_INTEGER | TAG_FLOAT => {
                    reader.skip(4)?;
                    Slot::Other
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.skip(8)?;
                    entries.push(Slot::Other);
                    index += 1;
                    Slot::Empty
                }
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.skip(2)?;
                    Slot::Other
                }
                TAG_FIELDREF
                | TAG_METHODREF
                | TAG_INTERFACE_METHODREF
                | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC
                | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    Slot::Other
                }
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Slot::Other
                }
                tag => return Err(ClassFileError::UnknownConstantTag { tag, offset }),
            };
            entries.push(slot);
            index += 1;
        }
        Ok(Self { entries })
    }

    /// Look up a UTF-8 entry
    pub fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.slot(index)? {
            Slot::Utf8(text) => Ok(text),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    /// Look up a class entry and return its internal name (slash-separated)
    pub fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.slot(index)? {
            Slot::Class(name_index) => self.utf8(*name_index),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    fn slot(&self, index: u16) -> Result<&Slot, ClassFileError> {
        if index == 0 {
            return Err(ClassFileError::BadConstantIndex(index));
        }
        self.entries
            .get(index as usize - 1)
            .ok_or(ClassFileError::BadConstantIndex(index))
    }
}
