//! The machine word

use serde::Serialize;
use std::fmt;

/// Size of a cell in bytes
pub const CELL_SIZE: usize = std::mem::size_of::<i32>();

/// A 32-bit abstract machine cell.
///
/// Cells carry integers, addresses into machine memory, packed characters,
/// fixed-point numbers and the raw bits of `f32` values alike. The meaning is
/// decided by whoever reads the cell.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell(i32);

impl Cell {
    /// The zero cell
    pub const ZERO: Cell = Cell(0);

    /// Create a cell from an integer
    #[inline]
    pub const fn new(value: i32) -> Self {
        Cell(value)
    }

    /// Reinterpret the bits of a float as a cell
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Cell(value.to_bits() as i32)
    }

    /// Reinterpret the cell bits as a float
    #[inline]
    pub fn as_f32(self) -> f32 {
        f32::from_bits(self.0 as u32)
    }

    /// The integer value
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// The cell as an unsigned quantity
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// The cell as a machine address, `None` when negative
    #[inline]
    pub fn as_usize(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// Little-endian bytes of the cell
    #[inline]
    pub fn to_le_bytes(self) -> [u8; CELL_SIZE] {
        self.0.to_le_bytes()
    }

    /// Build a cell from little-endian bytes
    #[inline]
    pub fn from_le_bytes(bytes: [u8; CELL_SIZE]) -> Self {
        Cell(i32::from_le_bytes(bytes))
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell(value as i32)
    }
}

impl From<Cell> for i32 {
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_bits_survive() {
        let cell = Cell::from_f32(1.5);
        assert_eq!(cell.as_i32(), 0x3FC0_0000);
        assert_eq!(cell.as_f32(), 1.5);
    }

    #[test]
    fn test_negative_cell_is_not_an_address() {
        assert_eq!(Cell::new(-4).as_usize(), None);
        assert_eq!(Cell::new(8).as_usize(), Some(8));
    }

    #[test]
    fn test_display_is_integer() {
        assert_eq!(Cell::new(-42).to_string(), "-42");
        assert_eq!(Cell::from(true), Cell::new(1));
    }
}
