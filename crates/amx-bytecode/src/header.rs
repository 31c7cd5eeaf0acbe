//! Program image header

use crate::encoder::{DecodeError, ImageReader, ImageWriter};
use bitflags::bitflags;

/// Signature of an image compiled for 32-bit cells
pub const MAGIC: u16 = 0xF1E0;

/// Newest image file format this loader reads
pub const CUR_FILE_VERSION: u8 = 11;

/// Oldest image file format this loader reads
pub const MIN_FILE_VERSION: u8 = 11;

/// Machine version; images requiring a newer machine are rejected
pub const CUR_AMX_VERSION: u8 = 11;

/// Size of one table record: `{address: u32, nameofs: u32}`
pub const FUNCSTUB_SIZE: usize = 8;

/// Size of the encoded header in bytes
pub const HEADER_SIZE: usize = 60;

bitflags! {
    /// Status flags stored in the header and on a live machine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AmxFlags: u16 {
        /// All function calls use overlays
        const OVERLAY = 0x01;
        /// Symbolic info available
        const DEBUG = 0x02;
        /// No array bounds checking; no BREAK opcodes
        const NOCHECKS = 0x04;
        /// Script uses the sleep instruction
        const SLEEP = 0x08;
        /// Image is encrypted
        const CRYPT = 0x10;
        /// Data section is explicitly initialized
        const DSEG_INIT = 0x20;
        /// Script uses the optimized SYSREQ opcode
        const SYSREQN = 0x800;
        /// All native functions are registered
        const NTVREG = 0x1000;
        /// Machine is JIT compiled
        const JITC = 0x2000;
        /// Busy verifying P-code
        const VERIFY = 0x4000;
        /// Machine has been initialized
        const INIT = 0x8000;
    }
}

/// Raw image header. Offsets are relative to the start of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmxHeader {
    /// Size of the image in bytes
    pub size: i32,
    /// Signature
    pub magic: u16,
    /// File format version
    pub file_version: u8,
    /// Required machine version
    pub amx_version: u8,
    /// Image flags
    pub flags: u16,
    /// Size of one table record
    pub defsize: i16,
    /// Start of the code section
    pub cod: i32,
    /// Start of the data section
    pub dat: i32,
    /// Initial heap top
    pub hea: i32,
    /// Stack top (end of the stack/heap area)
    pub stp: i32,
    /// Entry point of `main`, or -1
    pub cip: i32,
    /// Public function table
    pub publics: i32,
    /// Native function table
    pub natives: i32,
    /// Library table
    pub libraries: i32,
    /// Public variable table
    pub pubvars: i32,
    /// Tag name table
    pub tags: i32,
    /// Name table
    pub nametable: i32,
    /// Overlay table
    pub overlays: i32,
}

impl AmxHeader {
    /// Decode the header from the start of an image
    pub fn decode(reader: &mut ImageReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            size: reader.read_i32()?,
            magic: reader.read_u16()?,
            file_version: reader.read_u8()?,
            amx_version: reader.read_u8()?,
            flags: reader.read_u16()?,
            defsize: reader.read_i16()?,
            cod: reader.read_i32()?,
            dat: reader.read_i32()?,
            hea: reader.read_i32()?,
            stp: reader.read_i32()?,
            cip: reader.read_i32()?,
            publics: reader.read_i32()?,
            natives: reader.read_i32()?,
            libraries: reader.read_i32()?,
            pubvars: reader.read_i32()?,
            tags: reader.read_i32()?,
            nametable: reader.read_i32()?,
            overlays: reader.read_i32()?,
        })
    }

    /// Encode the header
    pub fn encode(&self, writer: &mut ImageWriter) {
        writer.emit_i32(self.size);
        writer.emit_u16(self.magic);
        writer.emit_u8(self.file_version);
        writer.emit_u8(self.amx_version);
        writer.emit_u16(self.flags);
        writer.emit_i16(self.defsize);
        for field in [
            self.cod,
            self.dat,
            self.hea,
            self.stp,
            self.cip,
            self.publics,
            self.natives,
            self.libraries,
            self.pubvars,
            self.tags,
            self.nametable,
            self.overlays,
        ] {
            writer.emit_i32(field);
        }
    }

    /// Flags known to this loader; unknown bits are dropped
    pub fn amx_flags(&self) -> AmxFlags {
        AmxFlags::from_bits_truncate(self.flags)
    }
}
