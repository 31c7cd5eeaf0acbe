//! Status codes shared by the machine, the loader and native libraries
//!
//! Success is `Ok(())`; every other status is an [`AmxError`]. The numeric
//! codes match the ones a Pawn host sees, so they can cross an FFI or logging
//! boundary unchanged.

use serde::Serialize;

/// Result type for machine and native calls
pub type AmxResult<T> = Result<T, AmxError>;

/// Every non-success status the abstract machine can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
pub enum AmxError {
    /// Forced exit
    #[error("forced exit")]
    ForcedExit,

    /// Assertion failed
    #[error("assertion failed")]
    AssertFailed,

    /// Stack and heap collided
    #[error("stack/heap collision")]
    StackCollision,

    /// Array index out of bounds
    #[error("index out of bounds")]
    IndexOutOfBounds,

    /// Address outside the data, heap or stack ranges
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Invalid instruction
    #[error("invalid instruction")]
    InvalidInstruction,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Heap underflow
    #[error("heap underflow")]
    HeapUnderflow,

    /// No callback, or invalid callback
    #[error("no callback, or invalid callback")]
    CallbackError,

    /// A native function failed
    #[error("native function failed")]
    NativeError,

    /// Division by zero
    #[error("divide by zero")]
    DivideByZero,

    /// Machine went to sleep; code can be restarted
    #[error("go into sleep mode")]
    Sleep,

    /// No implementation for this state, no fall-back
    #[error("no implementation for this state")]
    InvalidState,

    /// Out of memory
    #[error("out of memory")]
    OutOfMemory,

    /// Invalid program image format
    #[error("invalid file format")]
    InvalidFormat,

    /// Image is for a newer version of the machine
    #[error("file is for a newer version of the AMX")]
    InvalidVersion,

    /// Function not found
    #[error("function not found")]
    FunctionNotFound,

    /// Invalid index parameter (bad entry point)
    #[error("invalid index parameter")]
    InvalidIndex,

    /// Debugger cannot run
    #[error("debugger cannot run")]
    DebugFailure,

    /// Machine not initialized, or initialized twice
    #[error("AMX not initialized (or doubly initialized)")]
    InitFailure,

    /// Unable to set user data field (table full)
    #[error("unable to set user data field")]
    UserDataFailure,

    /// Cannot initialize the JIT
    #[error("cannot initialize the JIT")]
    InitJitFailure,

    /// Parameter error
    #[error("parameter error")]
    ParameterError,

    /// Result does not fit in range
    #[error("domain error, expression result does not fit in range")]
    DomainError,

    /// Unknown or unspecific error
    #[error("general error")]
    GeneralError,

    /// Overlays are unsupported or uninitialized
    #[error("overlays are unsupported or uninitialized")]
    OverlayError,
}

impl AmxError {
    /// Numeric status code of this error (never 0)
    pub fn code(self) -> i32 {
        match self {
            AmxError::ForcedExit => 1,
            AmxError::AssertFailed => 2,
            AmxError::StackCollision => 3,
            AmxError::IndexOutOfBounds => 4,
            AmxError::InvalidMemoryAccess => 5,
            AmxError::InvalidInstruction => 6,
            AmxError::StackUnderflow => 7,
            AmxError::HeapUnderflow => 8,
            AmxError::CallbackError => 9,
            AmxError::NativeError => 10,
            AmxError::DivideByZero => 11,
            AmxError::Sleep => 12,
            AmxError::InvalidState => 13,
            AmxError::OutOfMemory => 16,
            AmxError::InvalidFormat => 17,
            AmxError::InvalidVersion => 18,
            AmxError::FunctionNotFound => 19,
            AmxError::InvalidIndex => 20,
            AmxError::DebugFailure => 21,
            AmxError::InitFailure => 22,
            AmxError::UserDataFailure => 23,
            AmxError::InitJitFailure => 24,
            AmxError::ParameterError => 25,
            AmxError::DomainError => 26,
            AmxError::GeneralError => 27,
            AmxError::OverlayError => 28,
        }
    }

    /// Decode a numeric status. `Some(Ok(()))` is success, `None` is an
    /// unassigned code.
    pub fn from_code(code: i32) -> Option<AmxResult<()>> {
        let err = match code {
            0 => return Some(Ok(())),
            1 => AmxError::ForcedExit,
            2 => AmxError::AssertFailed,
            3 => AmxError::StackCollision,
            4 => AmxError::IndexOutOfBounds,
            5 => AmxError::InvalidMemoryAccess,
            6 => AmxError::InvalidInstruction,
            7 => AmxError::StackUnderflow,
            8 => AmxError::HeapUnderflow,
            9 => AmxError::CallbackError,
            10 => AmxError::NativeError,
            11 => AmxError::DivideByZero,
            12 => AmxError::Sleep,
            13 => AmxError::InvalidState,
            16 => AmxError::OutOfMemory,
            17 => AmxError::InvalidFormat,
            18 => AmxError::InvalidVersion,
            19 => AmxError::FunctionNotFound,
            20 => AmxError::InvalidIndex,
            21 => AmxError::DebugFailure,
            22 => AmxError::InitFailure,
            23 => AmxError::UserDataFailure,
            24 => AmxError::InitJitFailure,
            25 => AmxError::ParameterError,
            26 => AmxError::DomainError,
            27 => AmxError::GeneralError,
            28 => AmxError::OverlayError,
            _ => return None,
        };
        Some(Err(err))
    }
}

/// Numeric status of a result: 0 for success, the error code otherwise
pub fn status_code(status: &AmxResult<()>) -> i32 {
    match status {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}
