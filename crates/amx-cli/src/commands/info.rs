//! `amx info`: Display the header and symbol tables of a program image.

use super::read_image;
use amx_bytecode::{AmxFlags, FuncStub, ProgramImage};
use amx_engine::Amx;
use serde_json::json;
use std::path::Path;

pub fn execute(path: &Path, as_json: bool) -> anyhow::Result<()> {
    let bytes = read_image(path)?;
    let image = ProgramImage::decode(&bytes)?;
    let header = image.header();

    let mut amx = Amx::new();
    amx.init(&bytes)?;
    let memory = amx.memory_info()?;

    if as_json {
        let report = json!({
            "size": header.size,
            "file_version": header.file_version,
            "amx_version": header.amx_version,
            "flags": flag_names(image.flags()),
            "main": (header.cip >= 0).then_some(header.cip),
            "memory": {
                "code": memory.code,
                "data": memory.data,
                "stack_heap": memory.stack_heap,
            },
            "publics": stubs(image.publics()),
            "natives": image.natives().iter().map(|s| &s.name).collect::<Vec<_>>(),
            "libraries": image.libraries().iter().map(|s| &s.name).collect::<Vec<_>>(),
            "pubvars": stubs(image.pubvars()),
            "tags": stubs(image.tags()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Image:        {} ({} bytes)", path.display(), header.size);
    println!(
        "Version:      file {}, amx {}",
        header.file_version, header.amx_version
    );
    let flags = flag_names(image.flags());
    if flags.is_empty() {
        println!("Flags:        (none)");
    } else {
        println!("Flags:        {}", flags.join(" | "));
    }
    if header.cip >= 0 {
        println!("Main:         0x{:08x}", header.cip);
    }
    println!("Code:         {} bytes", memory.code);
    println!("Data:         {} bytes", memory.data);
    println!("Stack/heap:   {} bytes", memory.stack_heap);

    print_table("Publics", image.publics(), true);
    print_table("Natives", image.natives(), false);
    print_table("Libraries", image.libraries(), false);
    print_table("Public variables", image.pubvars(), true);
    print_table("Tags", image.tags(), true);

    Ok(())
}

fn flag_names(flags: AmxFlags) -> Vec<&'static str> {
    flags.iter_names().map(|(name, _)| name).collect()
}

fn stubs(table: &[FuncStub]) -> Vec<serde_json::Value> {
    table
        .iter()
        .map(|s| json!({ "name": s.name, "address": s.address }))
        .collect()
}

fn print_table(title: &str, table: &[FuncStub], with_address: bool) {
    if table.is_empty() {
        return;
    }
    println!();
    println!("{} ({}):", title, table.len());
    for (i, stub) in table.iter().enumerate() {
        if with_address {
            println!("  [{}] 0x{:08x} {}", i, stub.address, stub.name);
        } else {
            println!("  [{}] {}", i, stub.name);
        }
    }
}
