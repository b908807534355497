// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! 12x16 glyph tables for the two-page panel.
//!
//! Glyphs are generated at compile time from a classic 5x7 column font,
//! doubled in both directions and shifted down two rows so accented Latin-1
//! letters can carry their mark in rows 0-1. Each glyph is 24 bytes: the 12
//! columns of page 0 followed by the 12 columns of page 1, the layout
//! `Framebuffer::draw_area` expects for a 16-pixel-tall area.

pub const FONT_WIDTH: usize = 12;
pub const FONT_HEIGHT: usize = 16;
pub const GLYPH_BYTES: usize = FONT_WIDTH * FONT_HEIGHT / 8;

/// Glyph cells across the panel.
pub const SLOTS: u8 = 8;

pub type Glyph = [u8; GLYPH_BYTES];

/// First code point of the extended table.
pub const LATIN1_START: u32 = 0xA0;

/// Printable ASCII, `0x20..=0x7F`.
pub static FONT_ASCII: [Glyph; 96] = build_ascii();

/// Latin-1 supplement, `0xA0..=0xFF`.
pub static FONT_LATIN1: [Glyph; 96] = build_latin1();

/// Glyph for `c`, or `None` for code points outside both tables.
pub fn glyph(c: char) -> Option<&'static Glyph> {
    let code = c as u32;
    match code {
        0x20..=0x7F => Some(&FONT_ASCII[(code - 0x20) as usize]),
        0xA0..=0xFF => Some(&FONT_LATIN1[(code - LATIN1_START) as usize]),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Plain,
    Grave,
    Acute,
    Circumflex,
    Tilde,
    Diaeresis,
    Ring,
}

impl Mark {
    /// Page-0 column bits (rows 0-1) for the 12 glyph columns.
    const fn columns(self) -> [u8; FONT_WIDTH] {
        match self {
            Mark::Plain => [0; FONT_WIDTH],
            Mark::Grave => [0, 0, 0, 0, 1, 1, 2, 2, 0, 0, 0, 0],
            Mark::Acute => [0, 0, 0, 0, 2, 2, 1, 1, 0, 0, 0, 0],
            Mark::Circumflex => [0, 0, 0, 2, 2, 1, 1, 2, 2, 0, 0, 0],
            Mark::Tilde => [0, 0, 2, 2, 1, 1, 2, 2, 1, 1, 0, 0],
            Mark::Diaeresis => [0, 0, 0, 3, 3, 0, 0, 3, 3, 0, 0, 0],
            Mark::Ring => [0, 0, 0, 0, 2, 1, 1, 2, 0, 0, 0, 0],
        }
    }
}

/// Expand one 7-bit source column to 16 rows: bit n lands on rows 2n+2 and 2n+3.
const fn widen(column: u8) -> u16 {
    let mut out = 0u16;
    let mut bit = 0;
    while bit < 7 {
        if column & (1 << bit) != 0 {
            out |= 0b11 << (2 * bit + 2);
        }
        bit += 1;
    }
    out
}

const fn expand(source: [u8; 5], mark: Mark) -> Glyph {
    let mut glyph = [0u8; GLYPH_BYTES];
    let accent = mark.columns();
    let mut x = 0;
    while x < FONT_WIDTH {
        let column = if x >= 1 && x <= 10 {
            widen(source[(x - 1) / 2])
        } else {
            0
        };
        glyph[x] = column as u8 | accent[x];
        glyph[x + FONT_WIDTH] = (column >> 8) as u8;
        x += 1;
    }
    glyph
}

const fn build_ascii() -> [Glyph; 96] {
    let mut table = [[0u8; GLYPH_BYTES]; 96];
    let mut i = 0;
    while i < 96 {
        table[i] = expand(ASCII_5X7[i], Mark::Plain);
        i += 1;
    }
    table
}

const fn build_latin1() -> [Glyph; 96] {
    let mut table = [[0u8; GLYPH_BYTES]; 96];
    let mut i = 0;
    while i < 96 {
        let (base, mark) = LATIN1_BASE[i];
        table[i] = expand(ASCII_5X7[(base - 0x20) as usize], mark);
        i += 1;
    }
    table
}

/// Latin-1 code points drawn as an ASCII base letter plus an optional mark.
const LATIN1_BASE: [(u8, Mark); 96] = {
    use Mark::*;
    [
        // 0xA0
        (b' ', Plain), (b'!', Plain), (b'c', Plain), (b'L', Plain),
        (b'o', Plain), (b'Y', Plain), (b'|', Plain), (b'S', Plain),
        (b' ', Diaeresis), (b'C', Plain), (b'a', Plain), (b'<', Plain),
        (b'-', Plain), (b'-', Plain), (b'R', Plain), (b'-', Plain),
        // 0xB0
        (b' ', Ring), (b'+', Plain), (b'2', Plain), (b'3', Plain),
        (b' ', Acute), (b'u', Plain), (b'P', Plain), (b'.', Plain),
        (b',', Plain), (b'1', Plain), (b'o', Plain), (b'>', Plain),
        (b'/', Plain), (b'/', Plain), (b'/', Plain), (b'?', Plain),
        // 0xC0
        (b'A', Grave), (b'A', Acute), (b'A', Circumflex), (b'A', Tilde),
        (b'A', Diaeresis), (b'A', Ring), (b'A', Plain), (b'C', Plain),
        (b'E', Grave), (b'E', Acute), (b'E', Circumflex), (b'E', Diaeresis),
        (b'I', Grave), (b'I', Acute), (b'I', Circumflex), (b'I', Diaeresis),
        // 0xD0
        (b'D', Plain), (b'N', Tilde), (b'O', Grave), (b'O', Acute),
        (b'O', Circumflex), (b'O', Tilde), (b'O', Diaeresis), (b'x', Plain),
        (b'0', Plain), (b'U', Grave), (b'U', Acute), (b'U', Circumflex),
        (b'U', Diaeresis), (b'Y', Acute), (b'P', Plain), (b'B', Plain),
        // 0xE0
        (b'a', Grave), (b'a', Acute), (b'a', Circumflex), (b'a', Tilde),
        (b'a', Diaeresis), (b'a', Ring), (b'a', Plain), (b'c', Plain),
        (b'e', Grave), (b'e', Acute), (b'e', Circumflex), (b'e', Diaeresis),
        (b'i', Grave), (b'i', Acute), (b'i', Circumflex), (b'i', Diaeresis),
        // 0xF0
        (b'd', Plain), (b'n', Tilde), (b'o', Grave), (b'o', Acute),
        (b'o', Circumflex), (b'o', Tilde), (b'o', Diaeresis), (b':', Plain),
        (b'o', Plain), (b'u', Grave), (b'u', Acute), (b'u', Circumflex),
        (b'u', Diaeresis), (b'y', Acute), (b'p', Plain), (b'y', Diaeresis),
    ]
};

/// Column-major 5x7 ASCII font, bit 0 at the top.
#[rustfmt::skip]
const ASCII_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x08, 0x14, 0x54, 0x54, 0x3C], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x00, 0x7F, 0x10, 0x28, 0x44], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
    [0x00, 0x00, 0x00, 0x00, 0x00], // DEL
];
