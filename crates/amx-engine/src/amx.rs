//! Abstract machine state
//!
//! An [`Amx`] starts out empty. [`Amx::init`] is the base machine
//! initializer: it validates a program image, lays out data, heap and stack,
//! and copies the program's native table. Natives are bound afterwards by
//! [`Amx::register`](crate::natives).

use amx_bytecode::{AmxFlags, FuncStub, ProgramImage};
use amx_sdk::{AmxError, AmxResult, Cell, NativeFn};
use tracing::debug;

/// Sizes reported by [`Amx::memory_info`], in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    /// Code section
    pub code: usize,
    /// Initialized data section
    pub data: usize,
    /// Combined stack and heap area
    pub stack_heap: usize,
}

/// One entry of the machine's native table
#[derive(Clone)]
pub(crate) struct NativeSlot {
    pub(crate) name: String,
    pub(crate) handler: Option<NativeFn>,
}

/// A Pawn abstract machine instance
#[derive(Default)]
pub struct Amx {
    pub(crate) image: Option<ProgramImage>,
    pub(crate) flags: AmxFlags,
    /// Data, heap and stack. Addresses are offsets into this buffer.
    pub(crate) memory: Vec<u8>,
    /// Bottom of the heap (end of initialized data)
    pub(crate) hlw: usize,
    /// Heap top
    pub(crate) hea: usize,
    /// Stack pointer
    pub(crate) stk: usize,
    /// Stack top
    pub(crate) stp: usize,
    pub(crate) natives: Vec<NativeSlot>,
    /// Error raised by a native during the current call
    pub(crate) error: Option<AmxError>,
}

impl std::fmt::Debug for Amx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Amx")
            .field("flags", &self.flags)
            .field("hea", &self.hea)
            .field("stk", &self.stk)
            .field("stp", &self.stp)
            .field("natives", &self.natives.len())
            .finish()
    }
}

/// Zeroed data, heap and stack area; the size comes from the image header
fn allocate_memory(bytes: usize) -> AmxResult<Vec<u8>> {
    let mut memory = Vec::new();
    memory.try_reserve_exact(bytes).map_err(|_| {
        debug!(bytes, "machine memory allocation failed");
        AmxError::OutOfMemory
    })?;
    memory.resize(bytes, 0);
    Ok(memory)
}

impl Amx {
    /// Create an uninitialized machine
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the machine from a program image.
    ///
    /// Fails with `InitFailure` if the machine was already initialized, and
    /// with the loader's status (`InvalidFormat`, `InvalidVersion`,
    /// `OverlayError`) if the image is rejected, and with `OutOfMemory` if the
    /// requested stack and heap cannot be allocated. On failure the machine
    /// is left untouched.
    pub fn init(&mut self, program: &[u8]) -> AmxResult<()> {
        if self.is_initialized() {
            return Err(AmxError::InitFailure);
        }

        let image = ProgramImage::decode(program).map_err(|err| {
            debug!(error = %err, "program image rejected");
            AmxError::from(err)
        })?;

        let header = *image.header();
        let dat = header.dat as usize;
        let hlw = header.hea as usize - dat;
        let stp = header.stp as usize - dat;

        let mut memory = allocate_memory(stp)?;
        memory[..hlw].copy_from_slice(image.data_section());

        let natives: Vec<NativeSlot> = image
            .natives()
            .iter()
            .map(|stub| NativeSlot {
                name: stub.name.clone(),
                handler: None,
            })
            .collect();

        let mut flags = image.flags() | AmxFlags::INIT;
        if natives.is_empty() {
            flags |= AmxFlags::NTVREG;
        } else {
            flags.remove(AmxFlags::NTVREG);
        }

        debug!(
            natives = natives.len(),
            publics = image.publics().len(),
            data = hlw,
            stack_heap = stp - hlw,
            "machine initialized"
        );

        self.memory = memory;
        self.hlw = hlw;
        self.hea = hlw;
        self.stk = stp;
        self.stp = stp;
        self.natives = natives;
        self.flags = flags;
        self.error = None;
        self.image = Some(image);
        Ok(())
    }

    /// Whether [`init`](Self::init) has succeeded on this machine
    pub fn is_initialized(&self) -> bool {
        self.flags.contains(AmxFlags::INIT)
    }

    /// Current machine flags
    pub fn flags(&self) -> AmxFlags {
        self.flags
    }

    pub(crate) fn image(&self) -> AmxResult<&ProgramImage> {
        self.image.as_ref().ok_or(AmxError::InitFailure)
    }

    /// Code, data and stack/heap sizes
    pub fn memory_info(&self) -> AmxResult<MemoryInfo> {
        let header = self.image()?.header();
        Ok(MemoryInfo {
            code: (header.dat - header.cod) as usize,
            data: (header.hea - header.dat) as usize,
            stack_heap: (header.stp - header.hea) as usize,
        })
    }

    /// Maximum symbol name length
    pub fn name_length(&self) -> AmxResult<usize> {
        Ok(self.image()?.name_length())
    }

    // ========================================================================
    // Publics
    // ========================================================================

    /// Number of public functions
    pub fn public_count(&self) -> usize {
        self.image.as_ref().map_or(0, |i| i.publics().len())
    }

    /// Index of the public function `name`
    pub fn find_public(&self, name: &str) -> AmxResult<usize> {
        find(self.image()?.publics(), name)
    }

    /// Public function at `index`
    pub fn public_entry(&self, index: usize) -> AmxResult<&FuncStub> {
        self.image()?.publics().get(index).ok_or(AmxError::InvalidIndex)
    }

    // ========================================================================
    // Public variables
    // ========================================================================

    /// Number of public variables
    pub fn pubvar_count(&self) -> usize {
        self.image.as_ref().map_or(0, |i| i.pubvars().len())
    }

    /// Data address of the public variable `name`
    pub fn find_pubvar(&self, name: &str) -> AmxResult<Cell> {
        let image = self.image()?;
        let index = find(image.pubvars(), name)?;
        Ok(Cell::new(image.pubvars()[index].address as i32))
    }

    /// Public variable at `index`
    pub fn pubvar_entry(&self, index: usize) -> AmxResult<&FuncStub> {
        self.image()?.pubvars().get(index).ok_or(AmxError::InvalidIndex)
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Number of tag names
    pub fn tag_count(&self) -> usize {
        self.image.as_ref().map_or(0, |i| i.tags().len())
    }

    /// Tag at `index`
    pub fn tag_entry(&self, index: usize) -> AmxResult<&FuncStub> {
        self.image()?.tags().get(index).ok_or(AmxError::InvalidIndex)
    }

    /// Name of the tag with id `id`
    pub fn find_tag_id(&self, id: u32) -> AmxResult<&str> {
        self.image()?
            .tags()
            .iter()
            .find(|tag| tag.address == id)
            .map(|tag| tag.name.as_str())
            .ok_or(AmxError::FunctionNotFound)
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Record an error; the native call in progress reports it
    pub fn raise_error(&mut self, error: AmxError) {
        self.error = Some(error);
    }
}

fn find(table: &[FuncStub], name: &str) -> AmxResult<usize> {
    table
        .iter()
        .position(|stub| stub.name == name)
        .ok_or(AmxError::FunctionNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amx_bytecode::ImageBuilder;

    #[test]
    fn test_init_lays_out_memory() {
        let program = ImageBuilder::new()
            .data(&[10, 20])
            .stack_heap(256)
            .build();
        let mut amx = Amx::new();
        amx.init(&program).unwrap();

        assert!(amx.is_initialized());
        assert_eq!(amx.hlw, 8);
        assert_eq!(amx.hea, 8);
        assert_eq!(amx.stp, 8 + 256);
        assert_eq!(amx.stk, amx.stp);
        assert_eq!(&amx.memory[..4], &10i32.to_le_bytes());
    }

    #[test]
    fn test_init_twice_fails() {
        let program = ImageBuilder::new().build();
        let mut amx = Amx::new();
        amx.init(&program).unwrap();
        assert_eq!(amx.init(&program), Err(AmxError::InitFailure));
    }

    #[test]
    fn test_failed_init_leaves_machine_empty() {
        let mut amx = Amx::new();
        assert_eq!(amx.init(&[0u8; 8]), Err(AmxError::InvalidFormat));
        assert!(!amx.is_initialized());
        assert_eq!(amx.memory_info(), Err(AmxError::InitFailure));
    }

    #[test]
    fn test_unallocatable_memory_is_out_of_memory() {
        assert_eq!(allocate_memory(usize::MAX), Err(AmxError::OutOfMemory));
        assert_eq!(allocate_memory(16), Ok(vec![0u8; 16]));
    }

    #[test]
    fn test_ntvreg_without_natives() {
        let mut amx = Amx::new();
        amx.init(&ImageBuilder::new().build()).unwrap();
        assert!(amx.flags().contains(AmxFlags::INIT | AmxFlags::NTVREG));

        let mut amx = Amx::new();
        amx.init(&ImageBuilder::new().native("min").build()).unwrap();
        assert!(!amx.flags().contains(AmxFlags::NTVREG));
    }

    #[test]
    fn test_ntvreg_in_image_is_cleared() {
        let program = ImageBuilder::new()
            .native("min")
            .flags(AmxFlags::NTVREG)
            .build();
        let mut amx = Amx::new();
        amx.init(&program).unwrap();
        assert!(!amx.flags().contains(AmxFlags::NTVREG));
    }

    #[test]
    fn test_symbol_lookup() {
        let program = ImageBuilder::new()
            .data(&[0, 0])
            .public("main", 0)
            .public("OnExit", 12)
            .pubvar("score", 4)
            .tag("Fixed", 0x4000_0002)
            .build();
        let mut amx = Amx::new();
        amx.init(&program).unwrap();

        assert_eq!(amx.public_count(), 2);
        assert_eq!(amx.find_public("OnExit"), Ok(1));
        assert_eq!(amx.find_public("missing"), Err(AmxError::FunctionNotFound));
        assert_eq!(amx.public_entry(1).unwrap().address, 12);
        assert_eq!(amx.public_entry(2).unwrap_err(), AmxError::InvalidIndex);
        assert_eq!(amx.find_pubvar("score"), Ok(Cell::new(4)));
        assert_eq!(amx.pubvar_entry(0).unwrap().name, "score");
        assert_eq!(amx.tag_count(), 1);
        assert_eq!(amx.find_tag_id(0x4000_0002), Ok("Fixed"));
        assert_eq!(amx.tag_entry(0).unwrap().name, "Fixed");
        assert_eq!(amx.name_length(), Ok(6));
    }

    #[test]
    fn test_memory_info() {
        let program = ImageBuilder::new()
            .code(&[0; 12])
            .data(&[1, 2, 3])
            .stack_heap(1024)
            .build();
        let mut amx = Amx::new();
        amx.init(&program).unwrap();

        assert_eq!(
            amx.memory_info(),
            Ok(MemoryInfo {
                code: 12,
                data: 12,
                stack_heap: 1024
            })
        );
    }

    #[test]
    fn test_counts_before_init() {
        let amx = Amx::new();
        assert_eq!(amx.public_count(), 0);
        assert_eq!(amx.find_public("main"), Err(AmxError::InitFailure));
    }
}
