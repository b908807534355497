// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hardware-independent core of the tinyflash field-update bootloader.
//!
//! The bootloader verifies a staged payload by CRC-32, shows its progress on a
//! 96x16 I2C OLED, waits for the operator on a single push button and then
//! reprograms the start of on-chip flash with the payload.
//!
//! Everything that touches silicon goes through a narrow trait so the whole
//! sequence can run against simulated backends on the host:
//! - [`i2c::I2cController`]: raw I2C master status/command registers
//! - [`flash::FlashController`]: unlock/erase/program/lock primitives
//! - `embedded-hal` 1.0 pins and delay for reset line, button and timebase
//!
//! Every busy-wait in this crate is bounded. A stalled peripheral produces
//! [`Error::BusTimeout`] or [`flash::FlashFault::Timeout`] instead of hanging
//! the boot cycle; the confirmation button is the one deliberate exception.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

pub mod boot_flow;
pub mod checksum;
pub mod display;
pub mod error;
pub mod flash;
pub mod font;
pub mod framebuffer;
pub mod i2c;
pub mod layout;

pub use boot_flow::{BootConfig, Bootloader, Payload, Stage};
pub use checksum::{crc32, to_hex};
pub use display::{Display, Orientation};
pub use error::Error;
pub use flash::{FlashController, FlashFault, FlashRegion};
pub use framebuffer::Framebuffer;
pub use i2c::{I2cConfig, I2cController, I2cEngine, I2cTransaction, Status};
