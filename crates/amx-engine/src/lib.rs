//! AMX Engine
//!
//! The Pawn abstract machine state and its initialization:
//! - **Machine**: program loading, symbol lookup and memory (`amx`, `memory`)
//! - **Natives**: name-based binding and dispatch (`natives`)
//! - **Init**: base initializer plus library installers (`init`)
//!
//! # Example
//!
//! ```rust,ignore
//! use amx_engine::{Amx, BaseInitializer, Initializer};
//!
//! let initializer = Initializer::new(BaseInitializer).with_library(core_library());
//! let mut amx = Amx::new();
//! initializer.initialize(&mut amx, &program)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod amx;
pub mod init;
pub mod memory;
pub mod natives;

pub use amx::{Amx, MemoryInfo};
pub use init::{
    BaseInitializer, InitPolicy, InitReport, Initializer, LibraryInstaller, MachineInitializer,
    Stage, StageOutcome,
};
pub use memory::STACK_MARGIN;

pub use amx_sdk::{AmxError, AmxResult, Cell};
