// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Simulated backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation};
use tinyflash_common::i2c::{Direction, I2cController, Status};
use tinyflash_common::{Error, FlashController, FlashFault};

// =============================================================================
// Register-level I2C controller
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    Address(u8, Direction),
    Data(u8),
    Stop,
    ClearAckFailure,
}

/// Behaves like an STM32F1 master talking to a well-behaved slave, unless
/// told to stall or refuse.
#[derive(Default)]
pub struct SimController {
    pub events: Vec<BusEvent>,
    pub status_reads: usize,
    status: u32,
    /// NACK the address phase of the next `nack_addresses` transactions.
    pub nack_addresses: usize,
    /// Never raise any flag once this many data bytes went out.
    pub stall_after_bytes: Option<usize>,
    /// Never raise start-sent.
    pub stall_start: bool,
    bytes_sent: usize,
}

impl SimController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, wanted: &BusEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn data_bytes(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Data(b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

impl I2cController for SimController {
    fn send_start(&mut self) {
        self.events.push(BusEvent::Start);
        self.status = if self.stall_start {
            Status::BUSY
        } else {
            Status::START_SENT | Status::MASTER | Status::BUSY
        };
    }

    fn send_stop(&mut self) {
        self.events.push(BusEvent::Stop);
        self.status = 0;
    }

    fn send_address(&mut self, address: u8, direction: Direction) {
        self.events.push(BusEvent::Address(address, direction));
        self.status = if self.nack_addresses > 0 {
            self.nack_addresses -= 1;
            Status::MASTER | Status::BUSY | Status::ACK_FAILURE
        } else {
            Status::MASTER | Status::BUSY | Status::ADDRESS_SENT
        };
    }

    fn send_data(&mut self, byte: u8) {
        self.events.push(BusEvent::Data(byte));
        self.bytes_sent += 1;
        let stalled = self
            .stall_after_bytes
            .is_some_and(|limit| self.bytes_sent > limit);
        self.status = if stalled {
            Status::MASTER | Status::BUSY
        } else {
            Status::MASTER | Status::BUSY | Status::BYTE_FINISHED | Status::TX_EMPTY
        };
    }

    fn status(&mut self) -> Status {
        self.status_reads += 1;
        let status = Status(self.status);
        // Reading SR1 then SR2 clears ADDR.
        self.status &= !Status::ADDRESS_SENT;
        if status.contains(Status::ADDRESS_SENT) {
            self.status |= Status::TX_EMPTY;
        }
        status
    }

    fn clear_ack_failure(&mut self) {
        self.events.push(BusEvent::ClearAckFailure);
        self.status &= !Status::ACK_FAILURE;
    }
}

// =============================================================================
// embedded-hal I2C bus that records whole writes
// =============================================================================

#[derive(Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Fail every write once this many have succeeded.
    pub fail_after: Option<usize>,
    pub failure: Option<Error>,
    /// Every transaction, failed ones included.
    pub attempts: usize,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(count: usize, error: Error) -> Self {
        Self {
            fail_after: Some(count),
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Command bytes of a `0x80`-framed write, markers stripped.
    pub fn commands(write: &[u8]) -> Vec<u8> {
        assert!(write.len() % 2 == 0, "command frame has odd length");
        write
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0], 0x80, "missing command marker");
                pair[1]
            })
            .collect()
    }

    /// Every data burst (after the `0x40` marker), in order.
    pub fn data_bursts(&self) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(_, bytes)| bytes.first() == Some(&0x40))
            .map(|(_, bytes)| bytes[1..].to_vec())
            .collect()
    }
}

impl i2c::ErrorType for RecordingBus {
    type Error = Error;
}

impl I2c for RecordingBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.attempts += 1;
        if let Some(limit) = self.fail_after {
            if self.writes.len() >= limit {
                return Err(self.failure.unwrap_or(Error::BusTimeout));
            }
        }
        let mut bytes = Vec::new();
        for op in operations.iter() {
            match op {
                Operation::Write(chunk) => bytes.extend_from_slice(chunk),
                Operation::Read(_) => return Err(Error::ReadUnsupported),
            }
        }
        self.writes.push((address, bytes));
        Ok(())
    }
}

// =============================================================================
// Pins and delay
// =============================================================================

#[derive(Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// Replays a scripted sequence of levels (`true` = high), then stays at `idle`.
pub struct ScriptedButton {
    script: VecDeque<bool>,
    idle: bool,
    pub reads: usize,
}

impl ScriptedButton {
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            idle: true,
            reads: 0,
        }
    }

    /// `presses` full press/release cycles, each held low for a few samples.
    pub fn presses(presses: usize) -> Self {
        let mut script = Vec::new();
        for _ in 0..presses {
            script.extend([true, true, false, false, false, true]);
        }
        Self::new(&script)
    }

    pub fn exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl digital::ErrorType for ScriptedButton {
    type Error = Infallible;
}

impl InputPin for ScriptedButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.reads += 1;
        Ok(self.script.pop_front().unwrap_or(self.idle))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Accumulates requested delay instead of sleeping.
#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += ms as u64 * 1_000_000;
    }
}

// =============================================================================
// NOR flash
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlashEvent {
    Unlock,
    Lock,
    Erase(u32),
    Program(u32, u32),
}

/// Word-programmable NOR flash: erase sets 0xFF, programming a word that is
/// not erased fails like the real controller's programming-error flag.
pub struct SimFlash {
    pub base: u32,
    pub memory: Vec<u8>,
    pub page_size: u32,
    pub events: Vec<FlashEvent>,
    pub unlocked: bool,
    pub fail_erase_at: Option<(u32, FlashFault)>,
    pub fail_program_at: Option<(u32, FlashFault)>,
    /// Programmed words silently come back with this XOR applied.
    pub corrupt_at: Option<(u32, u32)>,
}

impl SimFlash {
    /// `size` bytes of flash at `base` pre-filled with `fill`.
    pub fn new(base: u32, size: usize, page_size: u32, fill: u8) -> Self {
        Self {
            base,
            memory: vec![fill; size],
            page_size,
            events: Vec::new(),
            unlocked: false,
            fail_erase_at: None,
            fail_program_at: None,
            corrupt_at: None,
        }
    }

    pub fn bytes(&self, address: u32, len: usize) -> &[u8] {
        let start = (address - self.base) as usize;
        &self.memory[start..start + len]
    }

    pub fn count(&self, wanted: impl Fn(&FlashEvent) -> bool) -> usize {
        self.events.iter().filter(|e| wanted(e)).count()
    }

    fn offset(&self, address: u32) -> usize {
        (address - self.base) as usize
    }
}

impl FlashController for SimFlash {
    fn unlock(&mut self) {
        self.events.push(FlashEvent::Unlock);
        self.unlocked = true;
    }

    fn lock(&mut self) {
        self.events.push(FlashEvent::Lock);
        self.unlocked = false;
    }

    fn erase_page(&mut self, address: u32) -> Result<(), FlashFault> {
        self.events.push(FlashEvent::Erase(address));
        if !self.unlocked {
            return Err(FlashFault::WriteProtected);
        }
        if let Some((at, fault)) = self.fail_erase_at {
            if at == address {
                return Err(fault);
            }
        }
        let start = self.offset(address);
        let end = start + self.page_size as usize;
        self.memory[start..end].fill(0xFF);
        Ok(())
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), FlashFault> {
        self.events.push(FlashEvent::Program(address, word));
        if !self.unlocked {
            return Err(FlashFault::WriteProtected);
        }
        if let Some((at, fault)) = self.fail_program_at {
            if at == address {
                return Err(fault);
            }
        }
        let start = self.offset(address);
        let current = &mut self.memory[start..start + 4];
        if current.iter().any(|&b| b != 0xFF) {
            return Err(FlashFault::ProgrammingError);
        }
        let mut stored = word;
        if let Some((at, mask)) = self.corrupt_at {
            if at == address {
                stored ^= mask;
            }
        }
        current.copy_from_slice(&stored.to_le_bytes());
        Ok(())
    }

    fn read_word(&mut self, address: u32) -> u32 {
        let start = self.offset(address);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.memory[start..start + 4]);
        u32::from_le_bytes(bytes)
    }
}
