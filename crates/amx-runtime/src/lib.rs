//! AMX Runtime
//!
//! Binds the machine initializer to the standard `core` and `fixed`
//! libraries. [`amx_init`] is the drop-in replacement for a bare
//! [`Amx::init`]: it initializes the machine and installs both libraries,
//! reporting only the machine's own status.

#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::RuntimeOptions;
pub use error::RuntimeError;

use amx_engine::{Amx, BaseInitializer, InitPolicy, InitReport, Initializer};
use amx_sdk::{AmxResult, NativeLibrary};
use amx_stdlib::{core_library, fixed_library, CORE_LIBRARY, FIXED_LIBRARY};

/// Standard library by name
pub fn library_by_name(name: &str) -> Option<NativeLibrary> {
    match name {
        CORE_LIBRARY => Some(core_library()),
        FIXED_LIBRARY => Some(fixed_library()),
        _ => None,
    }
}

/// Base initializer followed by the core and fixed-point libraries
pub fn standard_initializer(policy: InitPolicy) -> Initializer {
    Initializer::new(BaseInitializer)
        .with_library(core_library())
        .with_library(fixed_library())
        .with_policy(policy)
}

/// Initialize `amx` from `program` and install the standard libraries.
///
/// Returns the base initializer's status; library registration statuses are
/// not reported. Use [`initialize_with_standard_libraries`] to see them.
pub fn amx_init(amx: &mut Amx, program: &[u8]) -> AmxResult<()> {
    standard_initializer(InitPolicy::IgnoreLibraryFailures).initialize(amx, program)
}

/// Like [`amx_init`], but returns the status of every stage
pub fn initialize_with_standard_libraries(amx: &mut Amx, program: &[u8]) -> InitReport {
    standard_initializer(InitPolicy::IgnoreLibraryFailures).run(amx, program)
}
