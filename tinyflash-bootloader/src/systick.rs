// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! 1 kHz SysTick timebase and the blocking delay built on it.

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use cortex_m_rt::exception;
use embedded_hal::delay::DelayNs;

/// Milliseconds since `start`, wraps after ~49 days.
static TICKS: AtomicU32 = AtomicU32::new(0);

#[exception]
fn SysTick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

/// Start the 1 ms tick from the core clock.
pub fn start(mut syst: SYST, sysclk_hz: u32) {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(sysclk_hz / 1000 - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
}

pub fn millis() -> u32 {
    TICKS.load(Ordering::Relaxed)
}

/// Sleeps between ticks for millisecond waits, spins for shorter ones.
#[derive(Clone, Copy)]
pub struct Delay {
    cycles_per_us: u32,
}

impl Delay {
    pub fn new(sysclk_hz: u32) -> Self {
        Self {
            cycles_per_us: sysclk_hz / 1_000_000,
        }
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * self.cycles_per_us as u64).div_ceil(1000);
        cortex_m::asm::delay(cycles.min(u32::MAX as u64) as u32);
    }

    fn delay_ms(&mut self, ms: u32) {
        let start = millis();
        // The first tick can land right away, so wait one extra.
        let ticks = ms.saturating_add(1);
        while millis().wrapping_sub(start) < ticks {
            cortex_m::asm::wfi();
        }
    }
}
