// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! STM32F1 embedded flash controller.
//!
//! The controller programs 16 bits at a time, so each word goes out as two
//! half-word writes with PG set. Busy waits are bounded; a controller that
//! stays busy reports `FlashFault::Timeout`.

use stm32f1xx_hal::flash::Parts;
use stm32f1xx_hal::pac::{flash, FLASH};
use tinyflash_common::{FlashController, FlashFault};

const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xCDEF_89AB;

/// Status reads before giving up on BSY. A 1 KiB page erase takes ~20 ms.
const BUSY_POLL_LIMIT: u32 = 2_000_000;

// EOP | WRPRTERR | PGERR, all write-one-to-clear.
const SR_CLEAR: u32 = 0x34;

/// Takes over the HAL's flash handle once the clock tree is frozen.
pub struct Stm32Flash {
    _parts: Parts,
}

impl Stm32Flash {
    pub fn new(parts: Parts) -> Self {
        Self { _parts: parts }
    }

    fn regs(&self) -> &flash::RegisterBlock {
        // SAFETY: the HAL parts are owned here, so nothing else drives FLASH.
        unsafe { &*FLASH::ptr() }
    }

    fn wait_idle(&self) -> Result<(), FlashFault> {
        let regs = self.regs();
        for _ in 0..BUSY_POLL_LIMIT {
            let sr = regs.sr.read();
            if sr.bsy().bit_is_clear() {
                let result = if sr.wrprterr().bit_is_set() {
                    Err(FlashFault::WriteProtected)
                } else if sr.pgerr().bit_is_set() {
                    Err(FlashFault::ProgrammingError)
                } else {
                    Ok(())
                };
                regs.sr.write(|w| unsafe { w.bits(SR_CLEAR) });
                return result;
            }
        }
        Err(FlashFault::Timeout)
    }

    fn program_half_word(&self, address: u32, half: u16) -> Result<(), FlashFault> {
        // SAFETY: address is a half-word aligned flash address; PG is set.
        unsafe { core::ptr::write_volatile(address as *mut u16, half) };
        self.wait_idle()
    }
}

impl FlashController for Stm32Flash {
    fn unlock(&mut self) {
        let regs = self.regs();
        if regs.cr.read().lock().bit_is_set() {
            regs.keyr.write(|w| unsafe { w.bits(KEY1) });
            regs.keyr.write(|w| unsafe { w.bits(KEY2) });
        }
    }

    fn lock(&mut self) {
        self.regs().cr.modify(|_, w| w.lock().set_bit());
    }

    fn erase_page(&mut self, address: u32) -> Result<(), FlashFault> {
        self.wait_idle()?;
        let regs = self.regs();
        regs.cr.modify(|_, w| w.per().set_bit());
        regs.ar.write(|w| unsafe { w.bits(address) });
        regs.cr.modify(|_, w| w.strt().set_bit());
        let result = self.wait_idle();
        self.regs().cr.modify(|_, w| w.per().clear_bit());
        result
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashFault> {
        self.wait_idle()?;
        self.regs().cr.modify(|_, w| w.pg().set_bit());
        let result = self
            .program_half_word(address, word as u16)
            .and_then(|()| self.program_half_word(address + 2, (word >> 16) as u16));
        self.regs().cr.modify(|_, w| w.pg().clear_bit());
        result
    }

    fn read_word(&mut self, address: u32) -> u32 {
        // SAFETY: word-aligned address inside the memory-mapped flash.
        unsafe { core::ptr::read_volatile(address as *const u32) }
    }
}
