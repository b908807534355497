// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bootloader control flow: banner, two operator confirmations, checksum
//! display, erase, program, verify.
//!
//! The stage order is fixed and has no cancel path. Transitions live in the
//! pure [`Stage::next`] so they can be checked without hardware; the
//! [`Bootloader`] runner performs each stage's side effects against injected
//! backends. Any error halts the sequence in [`Stage::Halted`] with the error
//! code on screen, before the next flash operation starts.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

use crate::checksum::{crc32, to_hex};
use crate::display::Display;
use crate::error::Error;
use crate::flash::{self, FlashController, FlashRegion};

pub const TITLE: &str = "BL Flash";
pub const PROMPT: &str = "CONT?";
pub const CHECKING: &str = "CHK CRC";
pub const DONE: &str = "Done!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    Banner,
    WaitConfirm1,
    ChecksumDisplay,
    WaitConfirm2,
    Erase,
    Program,
    Verify,
    Done,
    Halted(Error),
}

impl Stage {
    /// Stage that follows a successful run of `self`. Terminal stages map to themselves.
    pub fn next(self, verify: bool) -> Stage {
        match self {
            Stage::Banner => Stage::WaitConfirm1,
            Stage::WaitConfirm1 => Stage::ChecksumDisplay,
            Stage::ChecksumDisplay => Stage::WaitConfirm2,
            Stage::WaitConfirm2 => Stage::Erase,
            Stage::Erase => Stage::Program,
            Stage::Program if verify => Stage::Verify,
            Stage::Program | Stage::Verify => Stage::Done,
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Halted(_))
    }
}

/// The image to install. Never owned by the loader; only read.
#[derive(Clone, Copy, Debug)]
pub struct Payload<'a> {
    pub bytes: &'a [u8],
    /// Absolute flash address the image is programmed to.
    pub destination: u32,
    /// CRC recorded when the image was staged, if known.
    pub expected_crc: Option<u32>,
}

impl<'a> Payload<'a> {
    pub fn new(bytes: &'a [u8], destination: u32) -> Self {
        Self {
            bytes,
            destination,
            expected_crc: None,
        }
    }

    pub fn with_expected_crc(mut self, crc: u32) -> Self {
        self.expected_crc = Some(crc);
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BootConfig {
    pub left_handed: bool,
    /// How long the title and "checking" screens stay up.
    pub banner_hold_ms: u32,
    /// Button sampling period while waiting for the operator.
    pub poll_interval_ms: u32,
    /// Read back the programmed words before declaring success.
    pub verify: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            left_handed: false,
            banner_hold_ms: 1000,
            poll_interval_ms: 1,
            verify: true,
        }
    }
}

/// Block until `button` reads low (pressed), then until it reads high (released).
///
/// No debounce and no timeout: this only paces the sequence. A pin read
/// error counts as "not pressed".
pub fn wait_for_confirm(button: &mut impl InputPin, delay: &mut impl DelayNs, poll_ms: u32) {
    while !button.is_low().unwrap_or(false) {
        delay.delay_ms(poll_ms);
    }
    while button.is_low().unwrap_or(false) {
        delay.delay_ms(poll_ms);
    }
}

pub struct Bootloader<'p, I, RST, BTN, D, F> {
    display: Display<I, RST>,
    button: BTN,
    delay: D,
    flash: F,
    payload: Payload<'p>,
    region: FlashRegion,
    config: BootConfig,
    stage: Stage,
    checksum: Option<u32>,
}

impl<'p, I, RST, BTN, D, F> Bootloader<'p, I, RST, BTN, D, F>
where
    I: I2c,
    I::Error: Into<Error>,
    RST: OutputPin,
    BTN: InputPin,
    D: DelayNs,
    F: FlashController,
{
    pub fn new(
        display: Display<I, RST>,
        button: BTN,
        delay: D,
        flash: F,
        payload: Payload<'p>,
        region: FlashRegion,
        config: BootConfig,
    ) -> Self {
        Self {
            display,
            button,
            delay,
            flash,
            payload,
            region,
            config,
            stage: Stage::Banner,
            checksum: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// CRC computed during the checksum stage.
    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    pub fn display(&self) -> &Display<I, RST> {
        &self.display
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Run stages until `Done` or `Halted`.
    pub fn run(&mut self) -> Result<(), Error> {
        while !self.stage.is_terminal() {
            self.step();
        }
        match self.stage {
            Stage::Halted(e) => Err(e),
            _ => Ok(()),
        }
    }

    /// Execute the current stage and advance. Returns the new stage.
    pub fn step(&mut self) -> Stage {
        let stage = self.stage;
        if stage.is_terminal() {
            return stage;
        }

        let result = self.execute(stage).and_then(|()| {
            let next = stage.next(self.config.verify);
            if next == Stage::Done {
                self.show(DONE)?;
            }
            Ok(next)
        });

        self.stage = match result {
            Ok(next) => {
                info!("stage {} -> {}", stage, next);
                next
            }
            Err(e) => {
                error!("stage {} failed: {}", stage, e);
                self.show_error(e);
                Stage::Halted(e)
            }
        };
        self.stage
    }

    fn execute(&mut self, stage: Stage) -> Result<(), Error> {
        match stage {
            Stage::Banner => self.banner(),
            Stage::WaitConfirm1 | Stage::WaitConfirm2 => {
                wait_for_confirm(
                    &mut self.button,
                    &mut self.delay,
                    self.config.poll_interval_ms,
                );
                Ok(())
            }
            Stage::ChecksumDisplay => self.checksum_display(),
            Stage::Erase => self.erase(),
            Stage::Program => {
                flash::program_words(&mut self.flash, self.payload.destination, self.payload.bytes)
            }
            Stage::Verify => {
                flash::verify_words(&mut self.flash, self.payload.destination, self.payload.bytes)
            }
            Stage::Done | Stage::Halted(_) => Ok(()),
        }
    }

    fn banner(&mut self) -> Result<(), Error> {
        self.display.init(self.config.left_handed, &mut self.delay)?;
        self.show(TITLE)?;
        self.delay.delay_ms(self.config.banner_hold_ms);
        self.show(PROMPT)
    }

    fn checksum_display(&mut self) -> Result<(), Error> {
        let actual = crc32(0, self.payload.bytes);
        self.checksum = Some(actual);
        info!("payload crc32 0x{:08x} ({} bytes)", actual, self.payload.bytes.len());

        self.show(CHECKING)?;
        self.delay.delay_ms(self.config.banner_hold_ms);
        self.show(&to_hex(actual))?;

        match self.payload.expected_crc {
            Some(expected) if expected != actual => {
                // Leave the wrong value readable before the error screen replaces it.
                self.delay.delay_ms(self.config.banner_hold_ms);
                Err(Error::ChecksumMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Validate the payload against the region, then erase the whole region.
    fn erase(&mut self) -> Result<(), Error> {
        if self.payload.bytes.is_empty() {
            return Err(Error::EmptyPayload);
        }
        if self.payload.destination != self.region.base() {
            return Err(Error::InvalidRegion);
        }
        self.region.check_fits(self.payload.bytes.len())?;
        flash::erase_pages(&mut self.flash, &self.region)
    }

    fn show(&mut self, text: &str) -> Result<(), Error> {
        self.display.clear_screen();
        self.display.draw_string(text)?;
        self.display.sync()
    }

    /// Best effort: if the display itself is the failure, there is nothing to show on.
    fn show_error(&mut self, e: Error) {
        if let Err(_err) = self.show(e.code()) {
            warn!("error screen not shown: {}", _err);
        }
    }
}
