//! Calls into the standard libraries through a live machine

use amx_bytecode::ImageBuilder;
use amx_engine::{Amx, AmxError, Cell};
use amx_stdlib::{core_library, fixed_library};

const NATIVES: &[&str] = &[
    "heapspace", "funcidx", "strlen", "strpack", "strunpack", "toupper", "clamp", "fixed",
    "strfixed", "fmul", "fdiv", "fround", "fsqroot",
];

fn machine() -> Amx {
    let program = NATIVES
        .iter()
        .fold(ImageBuilder::new(), |b, n| b.native(n))
        .public("main", 0)
        .public("OnTimer", 16)
        .stack_heap(1024)
        .build();
    let mut amx = Amx::new();
    amx.init(&program).unwrap();
    assert_eq!(
        amx.register(core_library().registry()),
        Err(AmxError::FunctionNotFound)
    );
    amx.register(fixed_library().registry()).unwrap();
    amx
}

fn call(amx: &mut Amx, name: &str, args: &[i32]) -> Result<i32, AmxError> {
    let args: Vec<Cell> = args.iter().copied().map(Cell::new).collect();
    amx.call_native_by_name(name, &args).map(|c| c.as_i32())
}

fn string(amx: &mut Amx, text: &str) -> i32 {
    let addr = amx.allot(text.len() + 1).unwrap();
    amx.write_string(addr, text, false, text.len() + 1).unwrap();
    addr.as_i32()
}

#[test]
fn test_heapspace_tracks_allotment() {
    let mut amx = machine();
    let before = call(&mut amx, "heapspace", &[]).unwrap();
    amx.allot(10).unwrap();
    assert_eq!(call(&mut amx, "heapspace", &[]), Ok(before - 40));
}

#[test]
fn test_funcidx() {
    let mut amx = machine();
    let timer = string(&mut amx, "OnTimer");
    let missing = string(&mut amx, "OnExit");
    assert_eq!(call(&mut amx, "funcidx", &[timer]), Ok(1));
    assert_eq!(call(&mut amx, "funcidx", &[missing]), Ok(-1));
}

#[test]
fn test_pack_and_unpack() {
    let mut amx = machine();
    let source = string(&mut amx, "Pawn script");
    let packed = amx.allot(4).unwrap().as_i32();
    let unpacked = amx.allot(16).unwrap().as_i32();

    assert_eq!(call(&mut amx, "strpack", &[packed, source, 4]), Ok(11));
    assert_eq!(call(&mut amx, "strlen", &[packed]), Ok(11));
    assert!(amx.read_cell(Cell::new(packed)).unwrap().as_u32() > 0x00FF_FFFF);

    assert_eq!(call(&mut amx, "strunpack", &[unpacked, packed, 16]), Ok(11));
    assert_eq!(amx.read_string(Cell::new(unpacked)).as_deref(), Ok("Pawn script"));

    assert_eq!(
        call(&mut amx, "strpack", &[packed, source, 0]),
        Err(AmxError::ParameterError)
    );
}

#[test]
fn test_bad_string_address() {
    let mut amx = machine();
    assert_eq!(
        call(&mut amx, "strlen", &[1 << 20]),
        Err(AmxError::InvalidMemoryAccess)
    );
}

#[test]
fn test_character_and_clamp() {
    let mut amx = machine();
    assert_eq!(call(&mut amx, "toupper", &['q' as i32]), Ok('Q' as i32));
    assert_eq!(call(&mut amx, "clamp", &[50, 0, 10]), Ok(10));
    assert_eq!(call(&mut amx, "clamp", &[-50, 0]), Ok(0));
}

#[test]
fn test_fixed_arithmetic() {
    let mut amx = machine();
    let text = string(&mut amx, "2.25");
    let value = call(&mut amx, "strfixed", &[text]).unwrap();
    assert_eq!(value, 2250);

    let three = call(&mut amx, "fixed", &[3]).unwrap();
    assert_eq!(call(&mut amx, "fmul", &[value, three]), Ok(6750));
    assert_eq!(call(&mut amx, "fsqroot", &[value]), Ok(1500));
    assert_eq!(call(&mut amx, "fround", &[6750, 0]), Ok(7));
    assert_eq!(call(&mut amx, "fround", &[6750, 3]), Ok(6));
}

#[test]
fn test_fixed_errors_are_raised() {
    let mut amx = machine();
    assert_eq!(call(&mut amx, "fdiv", &[1000, 0]), Err(AmxError::DivideByZero));
    assert_eq!(call(&mut amx, "fsqroot", &[-1000]), Err(AmxError::DomainError));
    assert_eq!(call(&mut amx, "fround", &[1000, 9]), Err(AmxError::ParameterError));
    // the machine stays usable
    assert_eq!(call(&mut amx, "fdiv", &[1000, 2000]), Ok(500));
}
