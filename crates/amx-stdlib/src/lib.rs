//! AMX Standard Library
//!
//! Native implementations for the `core` and `fixed` libraries a Pawn
//! program links against.

#![warn(missing_docs)]

pub mod chars;
pub mod fixed;
pub mod math;
pub mod registry;

pub use registry::{core_library, fixed_library, register_core, register_fixed};
pub use registry::{CORE_LIBRARY, FIXED_LIBRARY};
