// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Image embedded at build time, with the CRC `build.rs` computed for it.

use tinyflash_common::layout::FLASH_BASE;
use tinyflash_common::Payload;

include!(concat!(env!("OUT_DIR"), "/payload_info.rs"));

static IMAGE: [u8; PAYLOAD_LEN] = *include_bytes!(concat!(env!("OUT_DIR"), "/payload.bin"));

pub fn embedded() -> Payload<'static> {
    Payload::new(&IMAGE, FLASH_BASE).with_expected_crc(PAYLOAD_CRC)
}
