// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! I2C1 master at the register level.
//!
//! Only the primitives live here; sequencing, polling budgets and retries are
//! the engine's job in `tinyflash_common::i2c`.

use stm32f1xx_hal::pac::{I2C1, RCC};
use tinyflash_common::i2c::{Direction, I2cController, Status};

/// APB1 clock the timing values below are computed for.
const PCLK1_MHZ: u32 = 24;
/// Fast mode, Tlow/Thigh = 2, 400 kHz from a 24 MHz PCLK1.
const CCR_FAST_400K: u32 = (1 << 15) | 20;
/// 300 ns maximum rise time at 24 MHz, plus one.
const TRISE_FAST: u32 = 8;

pub struct Stm32I2c {
    regs: I2C1,
}

impl Stm32I2c {
    /// Reset I2C1, program its timing and enable it. PB6/PB7 must already be
    /// alternate open-drain.
    pub fn new(regs: I2C1) -> Self {
        // SAFETY: RCC was consumed by the clock setup, only the I2C1 bits are touched.
        let rcc = unsafe { &*RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.i2c1en().set_bit());
        rcc.apb1rstr.modify(|_, w| w.i2c1rst().set_bit());
        rcc.apb1rstr.modify(|_, w| w.i2c1rst().clear_bit());

        regs.cr1.write(|w| w.pe().clear_bit());
        regs.cr2.write(|w| unsafe { w.bits(PCLK1_MHZ) });
        regs.ccr.write(|w| unsafe { w.bits(CCR_FAST_400K) });
        regs.trise.write(|w| unsafe { w.bits(TRISE_FAST) });
        regs.cr1.modify(|_, w| w.pe().set_bit());

        Self { regs }
    }
}

impl I2cController for Stm32I2c {
    fn send_start(&mut self) {
        self.regs.cr1.modify(|_, w| w.start().set_bit());
    }

    fn send_stop(&mut self) {
        self.regs.cr1.modify(|_, w| w.stop().set_bit());
    }

    fn send_address(&mut self, address: u8, direction: Direction) {
        let rw = match direction {
            Direction::Write => 0,
            Direction::Read => 1,
        };
        self.regs
            .dr
            .write(|w| unsafe { w.bits(u32::from(address << 1 | rw)) });
    }

    fn send_data(&mut self, byte: u8) {
        self.regs.dr.write(|w| unsafe { w.bits(u32::from(byte)) });
    }

    fn status(&mut self) -> Status {
        // SR1 then SR2, in that order, clears ADDR.
        let sr1 = self.regs.sr1.read().bits();
        let sr2 = self.regs.sr2.read().bits();
        Status::from_registers(sr1 as u16, sr2 as u16)
    }

    fn clear_ack_failure(&mut self) {
        self.regs.sr1.modify(|_, w| w.af().clear_bit());
    }
}
