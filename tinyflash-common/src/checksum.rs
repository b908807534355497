// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Payload checksum and its on-screen rendering.

use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::String;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32/ISO-HDLC with zlib-style chaining: `seed` is the CRC of the bytes
/// that came before, `0` to start fresh.
pub fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    // The digest register holds the inverted, bit-reflected running value.
    let mut digest = CRC32.digest_with_initial((!seed).reverse_bits());
    digest.update(bytes);
    digest.finalize()
}

/// Render `value` as 8 uppercase hex digits, most significant nibble first.
pub fn to_hex(value: u32) -> String<8> {
    let mut out = String::new();
    for shift in (0..8).rev() {
        let nibble = ((value >> (shift * 4)) & 0xF) as u8;
        let mut c = b'0' + nibble;
        if c > b'9' {
            c += 7;
        }
        // 8 pushes into an 8-byte string cannot overflow.
        let _ = out.push(c as char);
    }
    out
}
