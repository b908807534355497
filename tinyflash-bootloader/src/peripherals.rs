// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the loader.
//!
//! Board wiring: OLED on I2C1 (PB6 = SCL, PB7 = SDA), OLED reset on PA8,
//! confirmation button on PA9 to ground.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f1xx_hal::gpio::{Alternate, Input, OpenDrain, Output, Pin, PullUp, PushPull};
use stm32f1xx_hal::pac;
use stm32f1xx_hal::prelude::*;
use tinyflash_common::layout::LOADER_BASE;

use crate::flash::Stm32Flash;
use crate::i2c::Stm32I2c;
use crate::systick::{self, Delay};

pub type SclPin = Pin<'B', 6, Alternate<OpenDrain>>;
pub type SdaPin = Pin<'B', 7, Alternate<OpenDrain>>;

/// OLED reset line.
pub struct ResetPin(Pin<'A', 8, Output<PushPull>>);

impl ErrorType for ResetPin {
    type Error = Infallible;
}

impl OutputPin for ResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

/// Active-low push button with the internal pull-up.
pub struct ButtonPin(Pin<'A', 9, Input<PullUp>>);

impl ErrorType for ButtonPin {
    type Error = Infallible;
}

impl InputPin for ButtonPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

pub struct Peripherals {
    pub i2c: Stm32I2c,
    pub reset: ResetPin,
    pub button: ButtonPin,
    pub flash: Stm32Flash,
    pub delay: Delay,
    /// Held so the bus pins stay in their alternate function.
    _bus_pins: (SclPin, SdaPin),
}

pub fn init() -> Peripherals {
    let dp = unsafe { pac::Peripherals::steal() };
    let cp = unsafe { cortex_m::Peripherals::steal() };

    // Exceptions must vector into this image, not the one being replaced.
    unsafe { cp.SCB.vtor.write(LOADER_BASE) };

    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    // HSI through the PLL, the board has no crystal.
    let clocks = rcc
        .cfgr
        .sysclk(48.MHz())
        .pclk1(24.MHz())
        .freeze(&mut flash.acr);
    let sysclk_hz = clocks.sysclk().raw();
    systick::start(cp.SYST, sysclk_hz);
    defmt::println!("sysclk {} Hz, pclk1 {} Hz", sysclk_hz, clocks.pclk1().raw());

    let mut gpioa = dp.GPIOA.split();
    let mut gpiob = dp.GPIOB.split();
    let scl = gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl);
    let sda = gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl);

    Peripherals {
        i2c: Stm32I2c::new(dp.I2C1),
        reset: ResetPin(gpioa.pa8.into_push_pull_output(&mut gpioa.crh)),
        button: ButtonPin(gpioa.pa9.into_pull_up_input(&mut gpioa.crh)),
        flash: Stm32Flash::new(flash),
        delay: Delay::new(sysclk_hz),
        _bus_pins: (scl, sda),
    }
}
