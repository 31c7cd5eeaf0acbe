//! AMX SDK - shared types for Pawn abstract machine hosts
//!
//! This crate holds what both sides of the native boundary need: the
//! [`Cell`] machine word, the [`AmxError`] status enumeration, the
//! [`NativeContext`] trait natives program against, and the registry types
//! used to bind natives by name.
//!
//! # Example
//!
//! ```ignore
//! use amx_sdk::{Cell, NativeLibrary};
//!
//! let mut library = NativeLibrary::new("demo");
//! library.registry_mut().register("double", |_ctx, args| {
//!     Ok(Cell::new(args.first().map(|c| c.as_i32() * 2).unwrap_or(0)))
//! });
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod handler;
pub mod value;

pub use context::NativeContext;
pub use error::{status_code, AmxError, AmxResult};
pub use handler::{NativeFn, NativeFunctionRegistry, NativeLibrary};
pub use value::{Cell, CELL_SIZE};

/// Argument at `index`, or zero when the script passed fewer arguments
#[inline]
pub fn arg(args: &[Cell], index: usize) -> Cell {
    args.get(index).copied().unwrap_or_default()
}
