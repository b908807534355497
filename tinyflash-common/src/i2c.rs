// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Blocking I2C master write engine.
//!
//! The engine drives a master-mode controller one status flag at a time:
//!   1. START, wait for start-generated with master + busy
//!   2. address with write intent, wait for address-acknowledged
//!   3. each byte, wait for byte-transfer-finished
//!   4. wait for transmit-empty, then STOP
//!
//! Every wait is bounded by [`I2cConfig::poll_limit`] status reads. On the
//! bare register interface a missing acknowledge or a slave holding SCL low
//! never raises the awaited flag, so without the bound the boot cycle would
//! hang forever. Expiry releases the bus with STOP and reports
//! [`Error::BusTimeout`]; an acknowledge-failure flag reports
//! [`Error::BusNack`]. Both are retried up to [`I2cConfig::retries`] times.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use crate::error::Error;

/// Snapshot of the controller's status registers.
///
/// Bit positions follow the STM32F1 layout: the low half mirrors SR1, the
/// high half mirrors SR2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u32);

impl Status {
    pub const START_SENT: u32 = 1 << 0;
    pub const ADDRESS_SENT: u32 = 1 << 1;
    pub const BYTE_FINISHED: u32 = 1 << 2;
    pub const TX_EMPTY: u32 = 1 << 7;
    pub const ACK_FAILURE: u32 = 1 << 10;
    pub const MASTER: u32 = 1 << 16;
    pub const BUSY: u32 = 1 << 17;

    /// Combine raw SR1/SR2 register values.
    pub fn from_registers(sr1: u16, sr2: u16) -> Self {
        Status(sr1 as u32 | (sr2 as u32) << 16)
    }

    pub fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }
}

/// Transfer direction encoded in the address byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

/// Register-level I2C master interface, one method per hardware action.
pub trait I2cController {
    fn send_start(&mut self);
    fn send_stop(&mut self);
    fn send_address(&mut self, address: u8, direction: Direction);
    fn send_data(&mut self, byte: u8);
    /// Read the status registers. Reading SR1 then SR2 also clears the
    /// address-sent flag, as the hardware requires.
    fn status(&mut self) -> Status;
    fn clear_ack_failure(&mut self);
}

/// Poll budget and retry policy.
#[derive(Clone, Copy, Debug)]
pub struct I2cConfig {
    /// Status reads per awaited flag before giving up.
    pub poll_limit: u32,
    /// Extra attempts of a whole transaction after a timeout or NACK.
    pub retries: u8,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            poll_limit: 100_000,
            retries: 2,
        }
    }
}

/// A validated write: 7-bit address and a non-empty byte sequence.
#[derive(Clone, Copy, Debug)]
pub struct I2cTransaction<'a> {
    address: u8,
    bytes: &'a [u8],
}

impl<'a> I2cTransaction<'a> {
    pub fn new(address: u8, bytes: &'a [u8]) -> Result<Self, Error> {
        if address > 0x7F {
            return Err(Error::InvalidAddress(address));
        }
        if bytes.is_empty() {
            return Err(Error::EmptyTransfer);
        }
        Ok(Self { address, bytes })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Write-only I2C master built on an [`I2cController`].
pub struct I2cEngine<C> {
    controller: C,
    config: I2cConfig,
}

impl<C: I2cController> I2cEngine<C> {
    pub fn new(controller: C, config: I2cConfig) -> Self {
        Self { controller, config }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn release(self) -> C {
        self.controller
    }

    /// Write `bytes` to `address`, framed by exactly one START and one STOP
    /// per attempt.
    pub fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        let txn = I2cTransaction::new(address, bytes)?;
        self.execute(txn.address(), core::iter::once(txn.bytes()))
    }

    fn execute<'b, I>(&mut self, address: u8, chunks: I) -> Result<(), Error>
    where
        I: Iterator<Item = &'b [u8]> + Clone,
    {
        let mut attempt = 0;
        loop {
            match self.try_write(address, chunks.clone()) {
                Err(e) if e.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    warn!("i2c 0x{:02x}: {}, retry {}", address, e, attempt);
                }
                result => return result,
            }
        }
    }

    fn try_write<'b>(
        &mut self,
        address: u8,
        chunks: impl Iterator<Item = &'b [u8]>,
    ) -> Result<(), Error> {
        self.controller.send_start();
        self.wait_for(Status::START_SENT | Status::MASTER | Status::BUSY)?;

        self.controller.send_address(address, Direction::Write);
        self.wait_for(Status::ADDRESS_SENT)?;

        for &byte in chunks.flat_map(|chunk| chunk.iter()) {
            self.controller.send_data(byte);
            self.wait_for(Status::BYTE_FINISHED)?;
        }

        self.wait_for(Status::TX_EMPTY)?;
        self.controller.send_stop();
        Ok(())
    }

    /// Spin until every bit of `mask` is set, aborting on NACK or budget expiry.
    fn wait_for(&mut self, mask: u32) -> Result<Status, Error> {
        for _ in 0..self.config.poll_limit {
            let status = self.controller.status();
            if status.contains(Status::ACK_FAILURE) {
                self.controller.clear_ack_failure();
                self.controller.send_stop();
                return Err(Error::BusNack);
            }
            if status.contains(mask) {
                return Ok(status);
            }
            core::hint::spin_loop();
        }
        self.controller.send_stop();
        Err(Error::BusTimeout)
    }
}

impl<C> ErrorType for I2cEngine<C> {
    type Error = Error;
}

impl<C: I2cController> I2c<SevenBitAddress> for I2cEngine<C> {
    /// Adjacent writes are merged into one START ... STOP frame; reads are refused.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations
            .iter()
            .any(|op| matches!(op, Operation::Read(_)))
        {
            return Err(Error::ReadUnsupported);
        }
        let total: usize = operations
            .iter()
            .map(|op| match op {
                Operation::Write(bytes) => bytes.len(),
                Operation::Read(_) => 0,
            })
            .sum();
        if address > 0x7F {
            return Err(Error::InvalidAddress(address));
        }
        if total == 0 {
            return Err(Error::EmptyTransfer);
        }

        let chunks = operations.iter().filter_map(|op| match op {
            Operation::Write(bytes) => Some(*bytes),
            Operation::Read(_) => None,
        });
        self.execute(address, chunks)
    }
}
