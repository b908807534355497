// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use std::env;
use std::fs;
use std::path::PathBuf;

use crc::{Crc, CRC_32_ISO_HDLC};

const LINKER_SCRIPT: &str = "stm32f103_loader.x";
const DEFAULT_PAYLOAD: &str = "payload.bin";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let linker_dir = manifest_dir.parent().unwrap().join("linker_scripts");

    let linker_script = fs::read_to_string(linker_dir.join(LINKER_SCRIPT))
        .expect("Failed to read stm32f103_loader.x");
    fs::write(out_dir.join("memory.x"), linker_script).expect("Failed to write memory.x");

    // Image to install, relative paths resolve against this crate.
    let payload_path = match env::var("TINYFLASH_PAYLOAD") {
        Ok(path) => manifest_dir.join(path),
        Err(_) => manifest_dir.join(DEFAULT_PAYLOAD),
    };
    let payload = match fs::read(&payload_path) {
        Ok(bytes) => bytes,
        Err(_) => {
            println!(
                "cargo:warning=no payload at {}, building with an empty image",
                payload_path.display()
            );
            Vec::new()
        }
    };
    fs::write(out_dir.join("payload.bin"), &payload).expect("Failed to write payload.bin");

    let crc = Crc::<u32>::new(&CRC_32_ISO_HDLC).checksum(&payload);
    fs::write(
        out_dir.join("payload_info.rs"),
        format!(
            "pub const PAYLOAD_CRC: u32 = 0x{crc:08X};\npub const PAYLOAD_LEN: usize = {};\n",
            payload.len()
        ),
    )
    .expect("Failed to write payload_info.rs");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg=-Tlink.x");
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!(
        "cargo:rerun-if-changed={}",
        linker_dir.join(LINKER_SCRIPT).display()
    );
    println!("cargo:rerun-if-changed={}", payload_path.display());
    println!("cargo:rerun-if-env-changed=TINYFLASH_PAYLOAD");
    println!("cargo:rerun-if-changed=build.rs");
}
