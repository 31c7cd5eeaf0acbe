//! Native table binding and dispatch
//!
//! The program image lists natives by name only. [`Amx::register`] binds
//! every still-unbound slot whose name a registry provides; dispatch is then
//! a direct indexed call.

use crate::amx::Amx;
use amx_bytecode::AmxFlags;
use amx_sdk::{AmxError, AmxResult, Cell, NativeContext, NativeFunctionRegistry};
use tracing::debug;

impl Amx {
    /// Bind natives from `registry`.
    ///
    /// Slots that are already bound keep their handler. Returns
    /// `FunctionNotFound` while any native of the program is still unbound;
    /// once all are bound the `NTVREG` flag is set and the call succeeds.
    pub fn register(&mut self, registry: &NativeFunctionRegistry) -> AmxResult<()> {
        if !self.is_initialized() {
            return Err(AmxError::InitFailure);
        }

        let mut bound = 0;
        for slot in self.natives.iter_mut().filter(|s| s.handler.is_none()) {
            if let Some(handler) = registry.get(&slot.name) {
                slot.handler = Some(handler);
                bound += 1;
            }
        }

        let unbound = self.natives.iter().filter(|s| s.handler.is_none()).count();
        debug!(bound, unbound, "natives registered");
        if unbound > 0 {
            return Err(AmxError::FunctionNotFound);
        }
        self.flags |= AmxFlags::NTVREG;
        Ok(())
    }

    /// Number of natives the program uses
    pub fn native_count(&self) -> usize {
        self.natives.len()
    }

    /// Index of the native `name`
    pub fn find_native(&self, name: &str) -> AmxResult<usize> {
        if !self.is_initialized() {
            return Err(AmxError::InitFailure);
        }
        self.natives
            .iter()
            .position(|slot| slot.name == name)
            .ok_or(AmxError::FunctionNotFound)
    }

    /// Name of the native at `index`
    pub fn native_name(&self, index: usize) -> AmxResult<&str> {
        self.natives
            .get(index)
            .map(|slot| slot.name.as_str())
            .ok_or(AmxError::InvalidIndex)
    }

    /// Whether the native at `index` has a handler
    pub fn is_native_bound(&self, index: usize) -> bool {
        self.natives
            .get(index)
            .is_some_and(|slot| slot.handler.is_some())
    }

    /// Names of natives that no registry has provided yet
    pub fn unbound_natives(&self) -> Vec<&str> {
        self.natives
            .iter()
            .filter(|slot| slot.handler.is_none())
            .map(|slot| slot.name.as_str())
            .collect()
    }

    /// Call the native at `index`.
    ///
    /// An error raised by the native through [`NativeContext::raise_error`]
    /// takes precedence over its return value.
    pub fn call_native(&mut self, index: usize, args: &[Cell]) -> AmxResult<Cell> {
        if !self.is_initialized() {
            return Err(AmxError::InitFailure);
        }
        let handler = self
            .natives
            .get(index)
            .ok_or(AmxError::InvalidIndex)?
            .handler
            .clone()
            .ok_or(AmxError::FunctionNotFound)?;

        self.error = None;
        let result = handler(self as &mut dyn NativeContext, args);
        match self.error.take() {
            Some(err) => Err(err),
            None => result,
        }
    }

    /// Call the native `name`
    pub fn call_native_by_name(&mut self, name: &str, args: &[Cell]) -> AmxResult<Cell> {
        let index = self.find_native(name)?;
        self.call_native(index, args)
    }
}

impl NativeContext for Amx {
    fn heap_space(&self) -> Cell {
        Amx::heap_space(self)
    }

    fn read_cell(&self, addr: Cell) -> AmxResult<Cell> {
        Amx::read_cell(self, addr)
    }

    fn write_cell(&mut self, addr: Cell, value: Cell) -> AmxResult<()> {
        Amx::write_cell(self, addr, value)
    }

    fn str_len(&self, addr: Cell) -> AmxResult<usize> {
        Amx::str_len(self, addr)
    }

    fn read_string(&self, addr: Cell) -> AmxResult<String> {
        Amx::read_string(self, addr)
    }

    fn write_string(
        &mut self,
        addr: Cell,
        text: &str,
        packed: bool,
        max_cells: usize,
    ) -> AmxResult<()> {
        Amx::write_string(self, addr, text, packed, max_cells)
    }

    fn find_public(&self, name: &str) -> Option<usize> {
        Amx::find_public(self, name).ok()
    }

    fn raise_error(&mut self, error: AmxError) {
        Amx::raise_error(self, error)
    }
}
