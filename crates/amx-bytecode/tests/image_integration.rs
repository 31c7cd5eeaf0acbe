//! Integration tests for program image decoding

use amx_bytecode::{AmxFlags, ImageBuilder, ImageError, ProgramImage, HEADER_SIZE};
use amx_sdk::AmxError;

#[test]
fn test_full_symbol_tables() {
    let bytes = ImageBuilder::new()
        .code(&[0u8; 16])
        .data(&[1, 2, 3, 4])
        .public("main", 0)
        .public("OnTick", 8)
        .native("heapspace")
        .native("fmul")
        .library("Fixed")
        .pubvar("counter", 4)
        .tag("Fixed", 0x4000_0001)
        .flags(AmxFlags::DEBUG)
        .main_entry(0)
        .build();

    let image = ProgramImage::decode(&bytes).expect("image should decode");

    assert_eq!(image.flags(), AmxFlags::DEBUG);
    assert_eq!(image.header().cip, 0);
    assert_eq!(image.publics()[1].name, "OnTick");
    assert_eq!(image.publics()[1].address, 8);
    assert_eq!(image.natives().len(), 2);
    assert!(image.natives().iter().all(|n| n.address == 0));
    assert_eq!(image.libraries()[0].name, "Fixed");
    assert_eq!(image.pubvars()[0].address, 4);
    assert_eq!(image.tags()[0].address, 0x4000_0001);
    assert_eq!(image.name_length(), "heapspace".len());
    assert_eq!(image.code_section().len(), 16);
    assert_eq!(image.data_section().len(), 16);
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut bytes = ImageBuilder::new().native("min").build();
    let declared = bytes.len();
    bytes.extend_from_slice(&[0xFF; 32]);

    let image = ProgramImage::decode(&bytes).unwrap();
    assert_eq!(image.as_bytes().len(), declared);
}

#[test]
fn test_garbage_is_invalid_format() {
    let garbage = vec![0x5Au8; HEADER_SIZE + 8];
    let err = ProgramImage::decode(&garbage).unwrap_err();
    assert_eq!(AmxError::from(err), AmxError::InvalidFormat);
}

#[test]
fn test_misordered_tables() {
    let mut bytes = ImageBuilder::new().public("main", 0).native("min").build();
    // natives table offset pointing before publics
    bytes[36..40].copy_from_slice(&40i32.to_le_bytes());
    assert!(matches!(
        ProgramImage::decode(&bytes),
        Err(ImageError::InvalidLayout(_))
    ));
}

#[test]
fn test_partial_record() {
    let mut bytes = ImageBuilder::new().native("min").native("max").build();
    let libraries = i32::from_le_bytes(bytes[40..44].try_into().unwrap());
    // shift the natives table start by half a record
    let natives = i32::from_le_bytes(bytes[36..40].try_into().unwrap());
    assert_eq!(libraries - natives, 16);
    bytes[36..40].copy_from_slice(&(natives + 4).to_le_bytes());
    bytes[32..36].copy_from_slice(&(natives + 4).to_le_bytes());
    assert!(matches!(
        ProgramImage::decode(&bytes),
        Err(ImageError::InvalidLayout(_))
    ));
}
