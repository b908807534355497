// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Memory map and board constants shared by the library and the firmware.

// --- Flash layout constants ---

pub const FLASH_BASE: u32 = 0x0800_0000;
pub const BOOT_REGION_SIZE: u32 = 16 * 1024; // reprogrammed region, starts at FLASH_BASE
pub const FLASH_PAGE_SIZE: u32 = 1024;
pub const WORD_SIZE: u32 = 4;

/// Where this loader is linked; everything below it is replaced by the payload.
pub const LOADER_BASE: u32 = FLASH_BASE + BOOT_REGION_SIZE;

const _: () = assert!(BOOT_REGION_SIZE % FLASH_PAGE_SIZE == 0);
const _: () = assert!(FLASH_PAGE_SIZE % WORD_SIZE == 0);

// --- Display ---

/// 7-bit bus address of the OLED controller.
pub const OLED_ADDRESS: u8 = 0x3C;

/// Visible columns of the panel.
pub const COLUMNS: usize = 96;
/// 8-pixel-tall pages of the panel.
pub const PAGES: usize = 2;

/// Last column of the controller's GRAM window.
pub const LAST_COLUMN: u8 = 0x7F;
