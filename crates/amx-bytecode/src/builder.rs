//! Program image builder
//!
//! Lays out a valid image: header, symbol tables, name table, code, data.
//! The stack/heap area follows the data section and is not stored in the
//! image.

use crate::encoder::ImageWriter;
use crate::header::{
    AmxFlags, AmxHeader, CUR_AMX_VERSION, CUR_FILE_VERSION, FUNCSTUB_SIZE, HEADER_SIZE, MAGIC,
};
use amx_sdk::CELL_SIZE;

/// Default size of the stack/heap area in bytes
pub const DEFAULT_STACK_HEAP: usize = 4096;

/// Builder for program images
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    flags: AmxFlags,
    cip: i32,
    code: Vec<u8>,
    data: Vec<i32>,
    stack_heap: usize,
    publics: Vec<(String, u32)>,
    natives: Vec<String>,
    libraries: Vec<String>,
    pubvars: Vec<(String, u32)>,
    tags: Vec<(String, u32)>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// Create a builder for an empty program
    pub fn new() -> Self {
        Self {
            flags: AmxFlags::empty(),
            cip: -1,
            code: Vec::new(),
            data: Vec::new(),
            stack_heap: DEFAULT_STACK_HEAP,
            publics: Vec::new(),
            natives: Vec::new(),
            libraries: Vec::new(),
            pubvars: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set image flags
    pub fn flags(mut self, flags: AmxFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the `main` entry point (code address)
    pub fn main_entry(mut self, cip: i32) -> Self {
        self.cip = cip;
        self
    }

    /// Set the code section
    pub fn code(mut self, code: &[u8]) -> Self {
        self.code = code.to_vec();
        self
    }

    /// Set the initialized data section, one cell per value
    pub fn data(mut self, cells: &[i32]) -> Self {
        self.data = cells.to_vec();
        self
    }

    /// Size of the stack/heap area in bytes (rounded up to whole cells)
    pub fn stack_heap(mut self, bytes: usize) -> Self {
        self.stack_heap = bytes.div_ceil(CELL_SIZE) * CELL_SIZE;
        self
    }

    /// Add a public function
    pub fn public(mut self, name: &str, address: u32) -> Self {
        self.publics.push((name.to_string(), address));
        self
    }

    /// Add a native the program calls
    pub fn native(mut self, name: &str) -> Self {
        self.natives.push(name.to_string());
        self
    }

    /// Declare a library
    pub fn library(mut self, name: &str) -> Self {
        self.libraries.push(name.to_string());
        self
    }

    /// Add a public variable at a data address
    pub fn pubvar(mut self, name: &str, address: u32) -> Self {
        self.pubvars.push((name.to_string(), address));
        self
    }

    /// Add a tag name
    pub fn tag(mut self, name: &str, id: u32) -> Self {
        self.tags.push((name.to_string(), id));
        self
    }

    /// Encode the image
    pub fn build(&self) -> Vec<u8> {
        let mut writer = ImageWriter::new();
        writer.emit_bytes(&[0u8; HEADER_SIZE]);

        let natives: Vec<(String, u32)> = self.natives.iter().map(|n| (n.clone(), 0)).collect();
        let libraries: Vec<(String, u32)> =
            self.libraries.iter().map(|n| (n.clone(), 0)).collect();

        let mut pending = Vec::new();
        let mut emit_table = |writer: &mut ImageWriter, records: &[(String, u32)]| -> i32 {
            let start = writer.offset() as i32;
            for (name, address) in records {
                writer.emit_u32(*address);
                pending.push((writer.reserve_i32(), name.clone()));
            }
            start
        };

        let publics = emit_table(&mut writer, &self.publics[..]);
        let natives_off = emit_table(&mut writer, &natives[..]);
        let libraries_off = emit_table(&mut writer, &libraries[..]);
        let pubvars = emit_table(&mut writer, &self.pubvars[..]);
        let tags = emit_table(&mut writer, &self.tags[..]);

        let nametable = writer.offset() as i32;
        let longest = pending.iter().map(|(_, name)| name.len()).max().unwrap_or(0);
        writer.emit_i16(longest.min(i16::MAX as usize) as i16);
        for (slot, name) in &pending {
            let at = writer.offset() as u32;
            writer.patch_u32(*slot, at);
            writer.emit_cstr(name);
        }

        writer.align_to(CELL_SIZE);
        let cod = writer.offset() as i32;
        writer.emit_bytes(&self.code);
        writer.align_to(CELL_SIZE);
        let dat = writer.offset() as i32;
        for cell in &self.data {
            writer.emit_i32(*cell);
        }
        let hea = writer.offset() as i32;
        let stp = hea + self.stack_heap.max(CELL_SIZE) as i32;

        let header = AmxHeader {
            size: writer.offset() as i32,
            magic: MAGIC,
            file_version: CUR_FILE_VERSION,
            amx_version: CUR_AMX_VERSION,
            flags: self.flags.bits(),
            defsize: FUNCSTUB_SIZE as i16,
            cod,
            dat,
            hea,
            stp,
            cip: self.cip,
            publics,
            natives: natives_off,
            libraries: libraries_off,
            pubvars,
            tags,
            nametable,
            overlays: 0,
        };

        let mut head = ImageWriter::new();
        header.encode(&mut head);
        let mut bytes = writer.into_bytes();
        bytes[..HEADER_SIZE].copy_from_slice(head.buffer());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ImageReader;

    #[test]
    fn test_empty_image_layout() {
        let bytes = ImageBuilder::new().build();
        let header = AmxHeader::decode(&mut ImageReader::new(&bytes)).unwrap();

        assert_eq!(header.magic, MAGIC);
        assert_eq!(header.publics, HEADER_SIZE as i32);
        assert_eq!(header.nametable, HEADER_SIZE as i32);
        assert_eq!(header.size as usize, bytes.len());
        assert_eq!(header.hea, header.dat);
        assert_eq!(header.stp - header.hea, DEFAULT_STACK_HEAP as i32);
        assert_eq!(header.cip, -1);
    }

    #[test]
    fn test_stack_heap_rounds_to_cells() {
        let bytes = ImageBuilder::new().stack_heap(10).build();
        let header = AmxHeader::decode(&mut ImageReader::new(&bytes)).unwrap();
        assert_eq!(header.stp - header.hea, 12);
    }

    #[test]
    fn test_names_are_patched() {
        let bytes = ImageBuilder::new().native("strlen").build();
        let header = AmxHeader::decode(&mut ImageReader::new(&bytes)).unwrap();

        let mut reader = ImageReader::new(&bytes);
        reader.seek(header.natives as usize);
        assert_eq!(reader.read_u32().unwrap(), 0);
        let nameofs = reader.read_u32().unwrap() as usize;
        assert_eq!(reader.cstr_at(nameofs).unwrap(), "strlen");
    }
}
