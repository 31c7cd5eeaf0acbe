//! Little-endian image reading and writing utilities

use thiserror::Error;

/// Errors that can occur while reading raw image bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Unexpected end of the image
    #[error("Unexpected end of image at offset {0}")]
    UnexpectedEnd(usize),

    /// Name is not valid UTF-8
    #[error("Invalid UTF-8 name at offset {0}")]
    InvalidUtf8(usize),

    /// Name is not NUL-terminated inside the image
    #[error("Unterminated name at offset {0}")]
    UnterminatedName(usize),
}

/// Image writer
///
/// Emits little-endian fields into a growable buffer and supports patching
/// offsets that are only known once later sections are laid out.
#[derive(Debug, Default)]
pub struct ImageWriter {
    buffer: Vec<u8>,
}

impl ImageWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Get the current buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the image bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get the current offset (length of the image so far)
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Emit a raw byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a 16-bit unsigned integer
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 16-bit signed integer
    pub fn emit_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit unsigned integer
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit signed integer
    pub fn emit_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit raw bytes
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Emit a NUL-terminated name
    pub fn emit_cstr(&mut self, name: &str) {
        self.buffer.extend_from_slice(name.as_bytes());
        self.buffer.push(0);
    }

    /// Pad with zeros up to a multiple of `align`
    pub fn align_to(&mut self, align: usize) {
        while self.buffer.len() % align != 0 {
            self.buffer.push(0);
        }
    }

    /// Reserve space for an i32 value (returns offset for later patching)
    pub fn reserve_i32(&mut self) -> usize {
        let offset = self.offset();
        self.emit_i32(0);
        offset
    }

    /// Patch a previously emitted i32 value at the given offset
    pub fn patch_i32(&mut self, offset: usize, value: i32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Patch a previously emitted u32 value at the given offset
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

/// Image reader
///
/// Sequential little-endian reads over a borrowed buffer, plus random access
/// for names that live at absolute offsets.
pub struct ImageReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ImageReader<'a> {
    /// Create a new reader
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

    /// Get the remaining bytes in the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Seek to a specific position
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self
            .position
            .checked_add(N)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(DecodeError::UnexpectedEnd(self.position))?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.position..end]);
        self.position = end;
        Ok(bytes)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    /// Read a 16-bit unsigned integer
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    /// Read a 16-bit signed integer
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    /// Read a 32-bit unsigned integer
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    /// Read a 32-bit signed integer
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    /// Read the NUL-terminated name starting at absolute `offset`.
    /// Does not move the cursor.
    pub fn cstr_at(&self, offset: usize) -> Result<String, DecodeError> {
        let tail = self
            .buffer
            .get(offset..)
            .ok_or(DecodeError::UnexpectedEnd(offset))?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::UnterminatedName(offset))?;
        String::from_utf8(tail[..len].to_vec()).map_err(|_| DecodeError::InvalidUtf8(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_emission() {
        let mut writer = ImageWriter::new();
        writer.emit_u8(0x42);
        writer.emit_u16(0x1234);
        writer.emit_u32(0xABCD_EF01);

        let bytes = writer.buffer();
        assert_eq!(bytes[0], 0x42);
        assert_eq!(bytes[1], 0x34); // Little-endian
        assert_eq!(bytes[2], 0x12);
        assert_eq!(bytes[3], 0x01);
        assert_eq!(bytes[6], 0xAB);
    }

    #[test]
    fn test_patch_reserved_slot() {
        let mut writer = ImageWriter::new();
        let slot = writer.reserve_i32();
        writer.emit_u8(7);
        writer.patch_i32(slot, -2);

        let mut reader = ImageReader::new(writer.buffer());
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = ImageReader::new(&[1, 2, 3]);
        assert_eq!(reader.read_u32(), Err(DecodeError::UnexpectedEnd(0)));
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
        assert_eq!(reader.read_u16(), Err(DecodeError::UnexpectedEnd(2)));
    }

    #[test]
    fn test_cstr_at() {
        let mut writer = ImageWriter::new();
        writer.emit_cstr("main");
        writer.emit_cstr("clamp");
        let reader = ImageReader::new(writer.buffer());

        assert_eq!(reader.cstr_at(0).unwrap(), "main");
        assert_eq!(reader.cstr_at(5).unwrap(), "clamp");
        assert_eq!(reader.cstr_at(64), Err(DecodeError::UnexpectedEnd(64)));
    }

    #[test]
    fn test_unterminated_name() {
        let reader = ImageReader::new(b"abc");
        assert_eq!(reader.cstr_at(0), Err(DecodeError::UnterminatedName(0)));
    }

    #[test]
    fn test_align_to() {
        let mut writer = ImageWriter::new();
        writer.emit_u8(1);
        writer.align_to(4);
        assert_eq!(writer.offset(), 4);
        writer.align_to(4);
        assert_eq!(writer.offset(), 4);
    }
}
