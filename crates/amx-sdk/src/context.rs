//! NativeContext trait: the machine as natives see it
//!
//! The engine implements this for its machine handle. Native libraries
//! (including the standard ones) program against the trait and never depend
//! on engine internals.

use crate::error::{AmxError, AmxResult};
use crate::value::Cell;

/// Abstract machine surface available to native functions.
///
/// Addresses are byte offsets relative to the start of the data section, as
/// they appear in cells passed by a script.
pub trait NativeContext {
    // ========================================================================
    // Memory
    // ========================================================================

    /// Free space between the heap top and the stack pointer, in bytes
    fn heap_space(&self) -> Cell;

    /// Read the cell at `addr`
    fn read_cell(&self, addr: Cell) -> AmxResult<Cell>;

    /// Write `value` to the cell at `addr`
    fn write_cell(&mut self, addr: Cell, value: Cell) -> AmxResult<()>;

    // ========================================================================
    // Strings
    // ========================================================================

    /// Length in characters of the packed or unpacked string at `addr`
    fn str_len(&self, addr: Cell) -> AmxResult<usize>;

    /// Read the packed or unpacked string at `addr`
    fn read_string(&self, addr: Cell) -> AmxResult<String>;

    /// Write `text` at `addr`, packed or unpacked, filling at most
    /// `max_cells` cells including the terminator
    fn write_string(&mut self, addr: Cell, text: &str, packed: bool, max_cells: usize)
        -> AmxResult<()>;

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Index of the public function named `name`
    fn find_public(&self, name: &str) -> Option<usize>;

    // ========================================================================
    // Errors
    // ========================================================================

    /// Record an error on the machine. The call that is in progress reports
    /// this error instead of its return value.
    fn raise_error(&mut self, error: AmxError);
}
