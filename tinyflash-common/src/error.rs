// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error taxonomy shared by the bus engine, display, flash programmer and boot flow.

use crate::flash::FlashFault;

/// Errors produced anywhere in the boot cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A status flag never appeared within the poll budget.
    BusTimeout,
    /// The target did not acknowledge its address or a data byte.
    BusNack,
    /// Address does not fit in 7 bits.
    InvalidAddress(u8),
    /// A write with no bytes was requested.
    EmptyTransfer,
    /// The engine is write-only.
    ReadUnsupported,
    /// Draw or cursor request outside the framebuffer / panel geometry.
    OutOfBounds,
    /// `draw_number` supports 2, 3 or 4 digits.
    UnsupportedDigitCount(u8),
    EraseFailed {
        address: u32,
        fault: FlashFault,
    },
    ProgramFailed {
        address: u32,
        fault: FlashFault,
    },
    /// Read-back after programming differs from the source word.
    VerifyMismatch {
        address: u32,
        expected: u32,
        actual: u32,
    },
    /// Payload CRC differs from the one recorded at build time.
    ChecksumMismatch {
        expected: u32,
        actual: u32,
    },
    EmptyPayload,
    PayloadTooLarge {
        len: usize,
        capacity: u32,
    },
    /// Region size is not a whole number of pages, or the base is not page aligned.
    InvalidRegion,
}

impl Error {
    /// Short label for the error halt screen, at most 8 glyph cells.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BusTimeout => "E:I2C TO",
            Error::BusNack => "E:NACK",
            Error::InvalidAddress(_) => "E:ADDR",
            Error::EmptyTransfer => "E:XFER",
            Error::ReadUnsupported => "E:READ",
            Error::OutOfBounds => "E:BOUNDS",
            Error::UnsupportedDigitCount(_) => "E:DIGITS",
            Error::EraseFailed { .. } => "E:ERASE",
            Error::ProgramFailed { .. } => "E:PROG",
            Error::VerifyMismatch { .. } => "E:VERIFY",
            Error::ChecksumMismatch { .. } => "E:CRC",
            Error::EmptyPayload => "E:EMPTY",
            Error::PayloadTooLarge { .. } => "E:SIZE",
            Error::InvalidRegion => "E:REGION",
        }
    }

    /// Bus errors worth another attempt; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::BusTimeout | Error::BusNack)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            Error::BusNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            _ => ErrorKind::Other,
        }
    }
}
