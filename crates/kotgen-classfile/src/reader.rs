//! Bounds-checked big-endian reader over raw class-file bytes
//!
//! The class-file format is big-endian throughout, so every multi-byte read
//! decodes network byte order.

use crate::error::ClassFileError;

/// Class-file byte reader
pub struct ClassReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ClassReader<'a> {
    /// Create a new reader over the given bytes
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get the current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the remaining byte count
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, ClassFileError> {
        if self.position >= self.buffer.len() {
            return Err(ClassFileError::UnexpectedEnd(self.position));
        }
        let value = self.buffer[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Read a 16-bit unsigned integer (big-endian)
    pub fn read_u16(&mut self) -> Result<u16, ClassFileError> {
        if self.position + 2 > self.buffer.len() {
            return Err(ClassFileError::UnexpectedEnd(self.position));
        }
        let bytes = [self.buffer[self.position], self.buffer[self.position + 1]];
        self.position += 2;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Read a 32-bit unsigned integer (big-endian)
    pub fn read_u32(&mut self) -> Result<u32, ClassFileError> {
        if self.position + 4 > self.buffer.len() {
            return Err(ClassFileError::UnexpectedEnd(self.position));
        }
        let bytes = [
            self.buffer[self.position],
            self.buffer[self.position + 1],
            self.buffer[self.position + 2],
            self.buffer[self.position + 3],
        ];
        self.position += 4;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Read a slice of `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        if self.position + len > self.buffer.len() {
            return Err(ClassFileError::UnexpectedEnd(self.position));
        }
        let slice = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        if self.position + len > self.buffer.len() {
            return Err(ClassFileError::UnexpectedEnd(self.position));
        }
        self.position += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let bytes = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34];
        let mut reader = ClassReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), 0xCAFE_BABE);
        assert_eq!(reader.read_u16().unwrap(), 0x0034);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncation_is_an_error() {
        let bytes = [0x01];
        let mut reader = ClassReader::new(&bytes);
        assert!(matches!(
            reader.read_u16(),
            Err(ClassFileError::UnexpectedEnd(0))
        ));
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert!(matches!(
            reader.read_u8(),
            Err(ClassFileError::UnexpectedEnd(1))
        ));
    }

    #[test]
    fn test_read_bytes_and_skip() {
        let bytes = [1, 2, 3, 4, 5];
        let mut reader = ClassReader::new(&bytes);
        reader.skip(2).unwrap();
        assert_eq!(reader.read_bytes(2).unwrap(), &[3, 4]);
        assert!(reader.read_bytes(2).is_err());
    }
}
