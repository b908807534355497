// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! tinyflash loader for STM32F103: shows the embedded payload's CRC on the
//! OLED, waits for two button confirmations and reflashes the boot region.

#![no_std]
#![no_main]

mod flash;
mod i2c;
mod payload;
mod peripherals;
mod systick;

use defmt_rtt as _;
use panic_probe as _;

use cortex_m_rt::entry;
use tinyflash_common::{BootConfig, Bootloader, Display, FlashRegion, I2cConfig, I2cEngine};

defmt::timestamp!("{=u32:ms}", systick::millis());

#[entry]
fn main() -> ! {
    defmt::println!("Loader init");

    let p = peripherals::init();
    let payload = payload::embedded();
    defmt::println!(
        "payload: {} bytes, crc 0x{:08x}",
        payload.bytes.len(),
        payload::PAYLOAD_CRC
    );

    let display = Display::new(I2cEngine::new(p.i2c, I2cConfig::default()), p.reset);
    let mut loader = Bootloader::new(
        display,
        p.button,
        p.delay,
        p.flash,
        payload,
        FlashRegion::BOOT,
        BootConfig::default(),
    );

    match loader.run() {
        Ok(()) => defmt::println!("Payload installed, power cycle to boot it"),
        Err(e) => defmt::error!("Halted: {}", e),
    }

    loop {
        cortex_m::asm::wfi();
    }
}
