// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Page erase, word programming and read-back over a fixed flash region.
//!
//! Every hardware operation is bracketed as unlock -> operation -> lock, one
//! page or one word at a time. The lock is restored even when the operation
//! fails. The first failing page or word aborts the whole pass with its
//! address; nothing is retried, since a half-erased or half-written image is
//! never something to build on.

use crate::error::Error;
use crate::layout::{BOOT_REGION_SIZE, FLASH_BASE, FLASH_PAGE_SIZE, WORD_SIZE};

/// Hardware-reported reason for a failed erase or program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashFault {
    WriteProtected,
    /// Target was not erased, or the controller flagged a programming error.
    ProgrammingError,
    /// Controller stayed busy past the poll budget.
    Timeout,
}

/// Controller primitives. Addresses are absolute.
pub trait FlashController {
    fn unlock(&mut self);
    fn lock(&mut self);
    fn erase_page(&mut self, address: u32) -> Result<(), FlashFault>;
    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashFault>;
    fn read_word(&mut self, address: u32) -> u32;
}

/// A page-aligned span of flash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashRegion {
    base: u32,
    size: u32,
    page_size: u32,
}

impl FlashRegion {
    /// The region replaced by the payload.
    pub const BOOT: FlashRegion = FlashRegion {
        base: FLASH_BASE,
        size: BOOT_REGION_SIZE,
        page_size: FLASH_PAGE_SIZE,
    };

    pub fn new(base: u32, size: u32, page_size: u32) -> Result<Self, Error> {
        if page_size == 0
            || page_size % WORD_SIZE != 0
            || size == 0
            || size % page_size != 0
            || base % page_size != 0
            || base.checked_add(size).is_none()
        {
            return Err(Error::InvalidRegion);
        }
        Ok(Self {
            base,
            size,
            page_size,
        })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        self.size / self.page_size
    }

    /// Absolute address of every page, in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        let base = self.base;
        let page_size = self.page_size;
        (0..self.page_count()).map(move |i| base + i * page_size)
    }

    /// Fail unless `len` payload bytes fit inside the region.
    pub fn check_fits(&self, len: usize) -> Result<(), Error> {
        if len as u64 > self.size as u64 {
            return Err(Error::PayloadTooLarge {
                len,
                capacity: self.size,
            });
        }
        Ok(())
    }
}

/// Erase every page of `region`.
pub fn erase_pages<F: FlashController>(flash: &mut F, region: &FlashRegion) -> Result<(), Error> {
    for address in region.pages() {
        flash.unlock();
        let result = flash.erase_page(address);
        flash.lock();
        result.map_err(|fault| Error::EraseFailed { address, fault })?;
    }
    info!("erased {} pages at 0x{:08x}", region.page_count(), region.base());
    Ok(())
}

/// Program `source` word by word starting at `base`.
///
/// A trailing partial word is padded with `0xFF` so the bytes past the end of
/// `source` keep their erased value.
pub fn program_words<F: FlashController>(
    flash: &mut F,
    base: u32,
    source: &[u8],
) -> Result<(), Error> {
    check_span(base, source.len())?;
    if source.len() % WORD_SIZE as usize != 0 {
        warn!(
            "payload length {} is not word aligned, padding with 0xFF",
            source.len()
        );
    }
    for (address, word) in words(base, source) {
        flash.unlock();
        let result = flash.program_word(address, word);
        flash.lock();
        result.map_err(|fault| Error::ProgramFailed { address, fault })?;
    }
    info!("programmed {} bytes at 0x{:08x}", source.len(), base);
    Ok(())
}

/// Read back what [`program_words`] wrote and compare word by word.
pub fn verify_words<F: FlashController>(
    flash: &mut F,
    base: u32,
    source: &[u8],
) -> Result<(), Error> {
    check_span(base, source.len())?;
    for (address, expected) in words(base, source) {
        let actual = flash.read_word(address);
        if actual != expected {
            return Err(Error::VerifyMismatch {
                address,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Fail unless `len` bytes, rounded up to a word, fit in the address space after `base`.
fn check_span(base: u32, len: usize) -> Result<(), Error> {
    let padded = (len as u64).div_ceil(WORD_SIZE as u64) * WORD_SIZE as u64;
    if base as u64 + padded > u32::MAX as u64 + 1 {
        return Err(Error::InvalidRegion);
    }
    Ok(())
}

/// Little-endian words of `source` paired with their destination address.
///
/// Addresses wrap past `u32::MAX`; the programming functions reject such spans first.
pub fn words(base: u32, source: &[u8]) -> impl Iterator<Item = (u32, u32)> + '_ {
    source
        .chunks(WORD_SIZE as usize)
        .enumerate()
        .map(move |(i, chunk)| {
            let mut bytes = [0xFFu8; WORD_SIZE as usize];
            bytes[..chunk.len()].copy_from_slice(chunk);
            (
                base.wrapping_add((i as u32).wrapping_mul(WORD_SIZE)),
                u32::from_le_bytes(bytes),
            )
        })
}
