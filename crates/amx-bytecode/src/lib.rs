//! AMX program image definitions
//!
//! This crate reads and writes the binary image a Pawn compiler produces:
//! the header, the public/native/library/pubvar/tag tables, the name table
//! and the code and data sections.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod encoder;
pub mod header;
pub mod image;

pub use builder::{ImageBuilder, DEFAULT_STACK_HEAP};
pub use encoder::{DecodeError, ImageReader, ImageWriter};
pub use header::{AmxFlags, AmxHeader, HEADER_SIZE, MAGIC};
pub use image::{FuncStub, ImageError, ProgramImage};
