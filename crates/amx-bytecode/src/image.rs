//! Program image decoding and validation

use crate::encoder::{DecodeError, ImageReader};
use crate::header::{
    AmxFlags, AmxHeader, CUR_AMX_VERSION, CUR_FILE_VERSION, FUNCSTUB_SIZE, HEADER_SIZE, MAGIC,
    MIN_FILE_VERSION,
};
use amx_sdk::{AmxError, CELL_SIZE};
use thiserror::Error;

/// Image decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Raw read error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Image shorter than its header
    #[error("Image too small: {0} bytes")]
    TooSmall(usize),

    /// Wrong signature
    #[error("Invalid magic number: {0:#06x}")]
    InvalidMagic(u16),

    /// File format outside the supported range
    #[error("Unsupported file version {0}")]
    UnsupportedFileVersion(u8),

    /// Image needs a newer machine
    #[error("Image requires a newer AMX (version {0})")]
    UnsupportedAmxVersion(u8),

    /// Table record size is not the one this loader understands
    #[error("Invalid definition record size: {0}")]
    InvalidDefSize(i16),

    /// Declared size disagrees with the buffer
    #[error("Declared image size {declared} does not fit in {actual} bytes")]
    SizeMismatch {
        /// Size field from the header
        declared: i32,
        /// Length of the buffer
        actual: usize,
    },

    /// Sections or tables are out of order, overlapping or misaligned
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A symbol name is longer than the name table allows
    #[error("Name {name:?} exceeds maximum length {max}")]
    NameTooLong {
        /// The offending name
        name: String,
        /// Maximum from the name table
        max: usize,
    },

    /// Overlay images need an overlay loader, which this host does not have
    #[error("Overlays are not supported")]
    OverlaysUnsupported,
}

impl ImageError {
    /// Machine status this error is reported as
    pub fn amx_error(&self) -> AmxError {
        match self {
            ImageError::UnsupportedFileVersion(_) | ImageError::UnsupportedAmxVersion(_) => {
                AmxError::InvalidVersion
            }
            ImageError::OverlaysUnsupported => AmxError::OverlayError,
            _ => AmxError::InvalidFormat,
        }
    }
}

impl From<ImageError> for AmxError {
    fn from(err: ImageError) -> Self {
        err.amx_error()
    }
}

/// A table record: an address (or tag id) and its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncStub {
    /// Code address, data address or tag id, depending on the table
    pub address: u32,
    /// Symbol name
    pub name: String,
}

/// A decoded and validated program image
#[derive(Debug, Clone)]
pub struct ProgramImage {
    header: AmxHeader,
    bytes: Vec<u8>,
    name_length: usize,
    publics: Vec<FuncStub>,
    natives: Vec<FuncStub>,
    libraries: Vec<FuncStub>,
    pubvars: Vec<FuncStub>,
    tags: Vec<FuncStub>,
}

impl ProgramImage {
    /// Decode and validate an image
    pub fn decode(data: &[u8]) -> Result<Self, ImageError> {
        if data.len() < HEADER_SIZE {
            return Err(ImageError::TooSmall(data.len()));
        }

        let mut reader = ImageReader::new(data);
        let header = AmxHeader::decode(&mut reader)?;

        if header.magic != MAGIC {
            return Err(ImageError::InvalidMagic(header.magic));
        }
        if !(MIN_FILE_VERSION..=CUR_FILE_VERSION).contains(&header.file_version) {
            return Err(ImageError::UnsupportedFileVersion(header.file_version));
        }
        if header.amx_version > CUR_AMX_VERSION {
            return Err(ImageError::UnsupportedAmxVersion(header.amx_version));
        }
        if header.defsize as usize != FUNCSTUB_SIZE {
            return Err(ImageError::InvalidDefSize(header.defsize));
        }
        if header.amx_flags().contains(AmxFlags::OVERLAY) {
            return Err(ImageError::OverlaysUnsupported);
        }

        let size = offset(header.size, "size")?;
        if size < HEADER_SIZE || size > data.len() {
            return Err(ImageError::SizeMismatch {
                declared: header.size,
                actual: data.len(),
            });
        }

        validate_layout(&header, size)?;

        let nametable = offset(header.nametable, "nametable")?;
        reader.seek(nametable);
        let name_length = reader.read_i16()?;
        let name_length = usize::try_from(name_length)
            .map_err(|_| ImageError::InvalidLayout(format!("name length {}", name_length)))?;

        let image = &data[..size];
        let table = |start: i32, end: i32| read_table(image, start, end, name_length);

        Ok(Self {
            publics: table(header.publics, header.natives)?,
            natives: table(header.natives, header.libraries)?,
            libraries: table(header.libraries, header.pubvars)?,
            pubvars: table(header.pubvars, header.tags)?,
            tags: table(header.tags, header.nametable)?,
            header,
            bytes: image.to_vec(),
            name_length,
        })
    }

    /// The raw header
    pub fn header(&self) -> &AmxHeader {
        &self.header
    }

    /// Image flags
    pub fn flags(&self) -> AmxFlags {
        self.header.amx_flags()
    }

    /// Maximum symbol name length from the name table
    pub fn name_length(&self) -> usize {
        self.name_length
    }

    /// Code section bytes
    pub fn code_section(&self) -> &[u8] {
        &self.bytes[self.header.cod as usize..self.header.dat as usize]
    }

    /// Initialized data section bytes
    pub fn data_section(&self) -> &[u8] {
        &self.bytes[self.header.dat as usize..self.header.hea as usize]
    }

    /// Public functions, in table order
    pub fn publics(&self) -> &[FuncStub] {
        &self.publics
    }

    /// Natives the program calls, in table order
    pub fn natives(&self) -> &[FuncStub] {
        &self.natives
    }

    /// Libraries the program declares
    pub fn libraries(&self) -> &[FuncStub] {
        &self.libraries
    }

    /// Public variables; addresses are data addresses
    pub fn pubvars(&self) -> &[FuncStub] {
        &self.pubvars
    }

    /// Tag names; addresses are tag ids
    pub fn tags(&self) -> &[FuncStub] {
        &self.tags
    }

    /// Whole image, as validated
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn offset(value: i32, what: &str) -> Result<usize, ImageError> {
    usize::try_from(value).map_err(|_| ImageError::InvalidLayout(format!("negative {}", what)))
}

fn validate_layout(header: &AmxHeader, size: usize) -> Result<(), ImageError> {
    let tables = [
        ("publics", header.publics),
        ("natives", header.natives),
        ("libraries", header.libraries),
        ("pubvars", header.pubvars),
        ("tags", header.tags),
        ("nametable", header.nametable),
    ];

    let mut previous = HEADER_SIZE;
    for (name, value) in tables {
        let start = offset(value, name)?;
        if start < previous {
            return Err(ImageError::InvalidLayout(format!(
                "{} table at {} precedes offset {}",
                name, start, previous
            )));
        }
        previous = start;
    }

    // The name table needs at least its length prefix before the code.
    let nametable = offset(header.nametable, "nametable")?;
    let cod = offset(header.cod, "cod")?;
    let dat = offset(header.dat, "dat")?;
    let hea = offset(header.hea, "hea")?;
    let stp = offset(header.stp, "stp")?;

    if nametable + 2 > cod {
        return Err(ImageError::InvalidLayout(format!(
            "code at {} overlaps name table at {}",
            cod, nametable
        )));
    }
    if !(cod <= dat && dat <= hea && hea < stp) {
        return Err(ImageError::InvalidLayout(format!(
            "sections out of order: cod={} dat={} hea={} stp={}",
            cod, dat, hea, stp
        )));
    }
    if hea > size {
        return Err(ImageError::InvalidLayout(format!(
            "data section ends at {} past image size {}",
            hea, size
        )));
    }
    if (hea - dat) % CELL_SIZE != 0 || (stp - dat) % CELL_SIZE != 0 {
        return Err(ImageError::InvalidLayout(
            "data, heap and stack must be cell aligned".to_string(),
        ));
    }
    Ok(())
}

fn read_table(
    image: &[u8],
    start: i32,
    end: i32,
    name_length: usize,
) -> Result<Vec<FuncStub>, ImageError> {
    let (start, end) = (start as usize, end as usize);
    let len = end - start;
    if len % FUNCSTUB_SIZE != 0 {
        return Err(ImageError::InvalidLayout(format!(
            "table at {} is not a whole number of records",
            start
        )));
    }

    let mut reader = ImageReader::new(image);
    reader.seek(start);
    let mut stubs = Vec::with_capacity(len / FUNCSTUB_SIZE);
    for _ in 0..len / FUNCSTUB_SIZE {
        let address = reader.read_u32()?;
        let nameofs = reader.read_u32()? as usize;
        let name = reader.cstr_at(nameofs)?;
        if name.len() > name_length {
            return Err(ImageError::NameTooLong {
                name,
                max: name_length,
            });
        }
        stubs.push(FuncStub { address, name });
    }
    Ok(stubs)
}
