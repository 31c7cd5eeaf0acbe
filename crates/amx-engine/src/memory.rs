//! Machine memory access: cells, heap allotment and strings
//!
//! Valid addresses are cell aligned and lie in `[0, hea)` (data and heap) or
//! `[stk, stp)` (stack). Everything between the heap top and the stack
//! pointer is free space and unreadable.

use crate::amx::Amx;
use amx_sdk::{AmxError, AmxResult, Cell, CELL_SIZE};

/// Free space the heap must leave below the stack, in bytes
pub const STACK_MARGIN: usize = 16 * CELL_SIZE;

/// Largest cell value that still starts an unpacked string
pub const UNPACKED_MAX: u32 = 0x00FF_FFFF;

const CHARS_PER_CELL: usize = CELL_SIZE;

impl Amx {
    fn offset_of(&self, addr: Cell) -> AmxResult<usize> {
        let addr = addr.as_usize().ok_or(AmxError::InvalidMemoryAccess)?;
        let in_heap = addr + CELL_SIZE <= self.hea;
        let in_stack = addr >= self.stk && addr + CELL_SIZE <= self.stp;
        if addr % CELL_SIZE != 0 || !(in_heap || in_stack) {
            return Err(AmxError::InvalidMemoryAccess);
        }
        Ok(addr)
    }

    /// Read the cell at `addr`
    pub fn read_cell(&self, addr: Cell) -> AmxResult<Cell> {
        let at = self.offset_of(addr)?;
        let mut bytes = [0u8; CELL_SIZE];
        bytes.copy_from_slice(&self.memory[at..at + CELL_SIZE]);
        Ok(Cell::from_le_bytes(bytes))
    }

    /// Write the cell at `addr`
    pub fn write_cell(&mut self, addr: Cell, value: Cell) -> AmxResult<()> {
        let at = self.offset_of(addr)?;
        self.memory[at..at + CELL_SIZE].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Free bytes between the heap top and the stack pointer
    pub fn heap_space(&self) -> Cell {
        Cell::new((self.stk - self.hea) as i32)
    }

    /// Reserve `cells` cells on the heap and return their address
    pub fn allot(&mut self, cells: usize) -> AmxResult<Cell> {
        if !self.is_initialized() {
            return Err(AmxError::InitFailure);
        }
        let bytes = cells
            .checked_mul(CELL_SIZE)
            .ok_or(AmxError::OutOfMemory)?;
        let free = self.stk - self.hea;
        if free < bytes || free - bytes < STACK_MARGIN {
            return Err(AmxError::OutOfMemory);
        }
        let addr = self.hea;
        self.hea += bytes;
        Ok(Cell::new(addr as i32))
    }

    /// Release heap memory from `addr` upwards
    pub fn release(&mut self, addr: Cell) -> AmxResult<()> {
        let at = addr.as_usize().ok_or(AmxError::HeapUnderflow)?;
        if at < self.hlw {
            return Err(AmxError::HeapUnderflow);
        }
        if at < self.hea {
            self.hea = at;
        }
        Ok(())
    }

    /// Length in characters of the string at `addr`
    pub fn str_len(&self, addr: Cell) -> AmxResult<usize> {
        let first = self.read_cell(addr)?;
        let mut len = 0;
        let mut at = addr;
        if first.as_u32() > UNPACKED_MAX {
            loop {
                let cell = self.read_cell(at)?;
                for byte in packed_bytes(cell) {
                    if byte == 0 {
                        return Ok(len);
                    }
                    len += 1;
                }
                at = next_cell(at)?;
            }
        }
        loop {
            if self.read_cell(at)? == Cell::ZERO {
                return Ok(len);
            }
            len += 1;
            at = next_cell(at)?;
        }
    }

    /// Read the packed or unpacked string at `addr`
    pub fn read_string(&self, addr: Cell) -> AmxResult<String> {
        let first = self.read_cell(addr)?;
        let mut text = String::new();
        let mut at = addr;
        if first.as_u32() > UNPACKED_MAX {
            loop {
                let cell = self.read_cell(at)?;
                for byte in packed_bytes(cell) {
                    if byte == 0 {
                        return Ok(text);
                    }
                    text.push(char::from(byte));
                }
                at = next_cell(at)?;
            }
        }
        loop {
            let cell = self.read_cell(at)?;
            if cell == Cell::ZERO {
                return Ok(text);
            }
            text.push(char::from_u32(cell.as_u32()).unwrap_or(char::REPLACEMENT_CHARACTER));
            at = next_cell(at)?;
        }
    }

    /// Write `text` at `addr`, truncated so that it fits in `max_cells`
    /// cells including the terminator
    pub fn write_string(
        &mut self,
        addr: Cell,
        text: &str,
        packed: bool,
        max_cells: usize,
    ) -> AmxResult<()> {
        if max_cells == 0 {
            return Ok(());
        }
        let mut at = addr;
        if packed {
            let max_chars = max_cells * CHARS_PER_CELL - 1;
            let mut bytes: Vec<u8> = text
                .chars()
                .take(max_chars)
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect();
            bytes.push(0);
            for chunk in bytes.chunks(CHARS_PER_CELL) {
                let mut word = [0u8; CELL_SIZE];
                word[..chunk.len()].copy_from_slice(chunk);
                // first character in the most significant byte
                self.write_cell(at, Cell::new(i32::from_be_bytes(word)))?;
                at = next_cell(at)?;
            }
            return Ok(());
        }
        for c in text.chars().take(max_cells - 1) {
            self.write_cell(at, Cell::new(u32::from(c) as i32))?;
            at = next_cell(at)?;
        }
        self.write_cell(at, Cell::ZERO)
    }
}

fn packed_bytes(cell: Cell) -> [u8; CELL_SIZE] {
    cell.as_i32().to_be_bytes()
}

fn next_cell(addr: Cell) -> AmxResult<Cell> {
    addr.as_i32()
        .checked_add(CELL_SIZE as i32)
        .map(Cell::new)
        .ok_or(AmxError::InvalidMemoryAccess)
}
