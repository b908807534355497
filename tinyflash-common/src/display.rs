// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Driver for the 96x16 SSD1306-class OLED on the I2C bus.
//!
//! Wire framing: every command byte travels behind a `0x80` control byte, a
//! pixel burst starts with a single `0x40` control byte. The panel sits in
//! the middle of the controller's 128-column GRAM, so column addresses are
//! shifted by 32 in the normal orientation and by 0 when mirrored.
//!
//! Drawing goes to the host-side [`Framebuffer`]; [`Display::sync`] pushes it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::error::Error;
use crate::font::{self, FONT_HEIGHT, FONT_WIDTH, SLOTS};
use crate::framebuffer::Framebuffer;
use crate::layout::{COLUMNS, LAST_COLUMN, OLED_ADDRESS, PAGES};

pub const COMMAND_MARKER: u8 = 0x80;
pub const DATA_MARKER: u8 = 0x40;

/// Controller command bytes.
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const CLOCK_DIVIDE: u8 = 0xD5;
    pub const MULTIPLEX_RATIO: u8 = 0xA8;
    pub const COM_SCAN_NORMAL: u8 = 0xC0;
    pub const COM_SCAN_REMAPPED: u8 = 0xC8;
    pub const DISPLAY_OFFSET: u8 = 0xD3;
    pub const START_LINE: u8 = 0x40;
    pub const SEGMENT_REMAP_NORMAL: u8 = 0xA0;
    pub const SEGMENT_REMAP_MIRRORED: u8 = 0xA1;
    pub const CHARGE_PUMP: u8 = 0x8D;
    pub const CHARGE_PUMP_ON: u8 = 0x14;
    pub const CHARGE_PUMP_OFF: u8 = 0x10;
    pub const COM_PINS: u8 = 0xDA;
    pub const CONTRAST: u8 = 0x81;
    pub const PRECHARGE: u8 = 0xD9;
    pub const VCOMH_LEVEL: u8 = 0xDB;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const NORMAL_POLARITY: u8 = 0xA6;
    pub const PAGE_ADDRESS: u8 = 0xB0;
    pub const COLUMN_ADDRESS: u8 = 0x21;
}

/// Number of command bytes sent by [`Display::init`].
pub const INIT_COMMANDS: usize = 23;

const RESET_HOLD_MS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Right-handed mounting.
    Normal,
    /// Left-handed mounting, panel rotated by 180 degrees.
    Mirrored,
}

impl Orientation {
    pub fn from_left_handed(left_handed: bool) -> Self {
        if left_handed {
            Orientation::Mirrored
        } else {
            Orientation::Normal
        }
    }

    /// First visible GRAM column.
    pub fn column_offset(self) -> u8 {
        match self {
            Orientation::Normal => 32,
            Orientation::Mirrored => 0,
        }
    }

    fn com_scan(self) -> u8 {
        match self {
            Orientation::Normal => cmd::COM_SCAN_NORMAL,
            Orientation::Mirrored => cmd::COM_SCAN_REMAPPED,
        }
    }

    fn segment_remap(self) -> u8 {
        match self {
            Orientation::Normal => cmd::SEGMENT_REMAP_NORMAL,
            Orientation::Mirrored => cmd::SEGMENT_REMAP_MIRRORED,
        }
    }
}

/// Last on/off command sent, to drop redundant traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Unknown,
    On,
    Off,
}

/// The power-up command list for `orientation`.
pub fn init_sequence(orientation: Orientation) -> [u8; INIT_COMMANDS] {
    [
        cmd::DISPLAY_OFF,
        cmd::CLOCK_DIVIDE,
        0x52,
        cmd::MULTIPLEX_RATIO,
        0x0F,
        orientation.com_scan(),
        cmd::DISPLAY_OFFSET,
        0x00,
        cmd::START_LINE,
        orientation.segment_remap(),
        cmd::CHARGE_PUMP,
        cmd::CHARGE_PUMP_ON,
        cmd::COM_PINS,
        0x02,
        cmd::CONTRAST,
        0x33,
        cmd::PRECHARGE,
        0xF1,
        cmd::VCOMH_LEVEL,
        0x30,
        cmd::RESUME_FROM_RAM,
        cmd::NORMAL_POLARITY,
        cmd::DISPLAY_ON,
    ]
}

pub struct Display<I, RST> {
    i2c: I,
    reset: RST,
    address: u8,
    framebuffer: Framebuffer,
    orientation: Orientation,
    column_offset: u8,
    power: PowerState,
}

impl<I, RST> Display<I, RST>
where
    I: I2c,
    I::Error: Into<Error>,
    RST: OutputPin,
{
    pub fn new(i2c: I, reset: RST) -> Self {
        Self {
            i2c,
            reset,
            address: OLED_ADDRESS,
            framebuffer: Framebuffer::new(),
            orientation: Orientation::Normal,
            column_offset: Orientation::Normal.column_offset(),
            power: PowerState::Unknown,
        }
    }

    /// Pulse the reset line, send the power-up sequence and clear the framebuffer.
    pub fn init(&mut self, left_handed: bool, delay: &mut impl DelayNs) -> Result<(), Error> {
        let orientation = Orientation::from_left_handed(left_handed);

        // Reset pin errors are infallible on every supported board.
        self.reset.set_high().ok();
        delay.delay_ms(RESET_HOLD_MS);
        self.reset.set_low().ok();
        delay.delay_ms(RESET_HOLD_MS);

        // Orientation only changes once the panel has accepted the sequence.
        self.send_commands(&init_sequence(orientation))?;
        self.orientation = orientation;
        self.column_offset = orientation.column_offset();
        self.power = PowerState::On;
        self.framebuffer.clear();
        Ok(())
    }

    /// Re-initialise only if `left_handed` differs from the current orientation.
    pub fn set_orientation(
        &mut self,
        left_handed: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error> {
        if Orientation::from_left_handed(left_handed) != self.orientation {
            self.init(left_handed, delay)?;
        }
        Ok(())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn column_offset(&self) -> u8 {
        self.column_offset
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn display_on(&mut self) -> Result<(), Error> {
        if self.power != PowerState::On {
            self.send_commands(&[cmd::CHARGE_PUMP, cmd::CHARGE_PUMP_ON, cmd::DISPLAY_ON])?;
            self.power = PowerState::On;
        }
        Ok(())
    }

    pub fn display_off(&mut self) -> Result<(), Error> {
        if self.power != PowerState::Off {
            self.send_commands(&[cmd::CHARGE_PUMP, cmd::CHARGE_PUMP_OFF, cmd::DISPLAY_OFF])?;
            self.power = PowerState::Off;
        }
        Ok(())
    }

    /// Open the GRAM write window at `column` of `page`, running to the last column.
    pub fn set_cursor(&mut self, column: u8, page: u8) -> Result<(), Error> {
        if column as usize >= COLUMNS || page as usize >= PAGES {
            return Err(Error::OutOfBounds);
        }
        self.send_commands(&[
            cmd::PAGE_ADDRESS + page,
            cmd::COLUMN_ADDRESS,
            column + self.column_offset,
            LAST_COLUMN,
        ])
    }

    /// Push both framebuffer pages to the panel.
    pub fn sync(&mut self) -> Result<(), Error> {
        for page in 0..PAGES {
            self.set_cursor(0, page as u8)?;
            let mut burst = [0u8; COLUMNS + 1];
            burst[0] = DATA_MARKER;
            if let Some(columns) = self.framebuffer.page(page) {
                burst[1..].copy_from_slice(columns);
            }
            self.i2c.write(self.address, &burst).map_err(Into::into)?;
        }
        Ok(())
    }

    pub fn clear_screen(&mut self) {
        self.framebuffer.clear();
    }

    pub fn draw_area(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        bitmap: &[u8],
    ) -> Result<(), Error> {
        self.framebuffer.draw_area(x, y, width, height, bitmap)
    }

    /// Full-width 96x8 strip on `page`.
    pub fn draw_bitmap(&mut self, page: usize, bitmap: &[u8; COLUMNS]) -> Result<(), Error> {
        self.draw_area(0, page * 8, COLUMNS, 8, bitmap)
    }

    /// Draw `c` in glyph cell `slot`. Cells past the right edge and code
    /// points without a glyph are skipped.
    pub fn draw_char(&mut self, c: char, slot: u8) -> Result<(), Error> {
        if slot >= SLOTS {
            return Ok(());
        }
        match font::glyph(c) {
            Some(glyph) => self.draw_area(
                slot as usize * FONT_WIDTH,
                0,
                FONT_WIDTH,
                FONT_HEIGHT,
                glyph,
            ),
            None => Ok(()),
        }
    }

    /// Draw `text` from the left edge, one glyph cell per character.
    pub fn draw_string(&mut self, text: &str) -> Result<(), Error> {
        for (slot, c) in text.chars().enumerate().take(SLOTS as usize) {
            self.draw_char(c, slot as u8)?;
        }
        Ok(())
    }

    /// Draw the low `digits` decimal digits of `value` starting at cell `slot`.
    pub fn draw_number(&mut self, value: u16, digits: u8, slot: u8) -> Result<(), Error> {
        if !(2..=4).contains(&digits) {
            return Err(Error::UnsupportedDigitCount(digits));
        }
        let mut divisor = 10u16.pow(digits as u32 - 1);
        for i in 0..digits {
            let digit = (value / divisor) % 10;
            self.draw_char(char::from(b'0' + digit as u8), slot.saturating_add(i))?;
            divisor /= 10;
        }
        Ok(())
    }

    /// Blank `width` columns of both pages starting at column `x`.
    pub fn blank_slot(&mut self, x: usize, width: usize) -> Result<(), Error> {
        if width == 0 {
            return Ok(());
        }
        let blank = [0u8; COLUMNS * PAGES];
        let len = width.min(COLUMNS) * PAGES;
        self.draw_area(x, 0, width, 16, &blank[..len])
    }

    pub fn release(self) -> (I, RST) {
        (self.i2c, self.reset)
    }

    /// Send `commands` as one `0x80`-framed write.
    ///
    /// At most [`INIT_COMMANDS`] commands fit in one frame; longer lists are
    /// `Error::OutOfBounds` and nothing is sent.
    pub fn send_commands(&mut self, commands: &[u8]) -> Result<(), Error> {
        if commands.len() > INIT_COMMANDS {
            return Err(Error::OutOfBounds);
        }
        let mut frame = [0u8; 2 * INIT_COMMANDS];
        let len = 2 * commands.len();
        for (pair, &command) in frame[..len].chunks_exact_mut(2).zip(commands) {
            pair[0] = COMMAND_MARKER;
            pair[1] = command;
        }
        self.i2c.write(self.address, &frame[..len]).map_err(Into::into)
    }
}
