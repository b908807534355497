// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! End-to-end tests of the boot sequence against simulated hardware.

mod support;

use support::{CountingDelay, FlashEvent, RecordingBus, RecordingPin, ScriptedButton, SimFlash};
use tinyflash_common::boot_flow::{wait_for_confirm, CHECKING, DONE, PROMPT, TITLE};
use tinyflash_common::{
    crc32, BootConfig, Bootloader, Display, Error, FlashFault, FlashRegion, Framebuffer, Payload,
    Stage,
};

const BASE: u32 = 0x0800_0000;
const REGION_SIZE: u32 = 256;
const PAGE: u32 = 64;

type TestLoader<'p> =
    Bootloader<'p, RecordingBus, RecordingPin, ScriptedButton, CountingDelay, SimFlash>;

fn region() -> FlashRegion {
    FlashRegion::new(BASE, REGION_SIZE, PAGE).unwrap()
}

fn old_flash() -> SimFlash {
    SimFlash::new(BASE, REGION_SIZE as usize, PAGE, 0x00)
}

fn loader_with(
    bus: RecordingBus,
    flash: SimFlash,
    payload: Payload<'_>,
    config: BootConfig,
) -> TestLoader<'_> {
    Bootloader::new(
        Display::new(bus, RecordingPin::default()),
        ScriptedButton::presses(2),
        CountingDelay::default(),
        flash,
        payload,
        region(),
        config,
    )
}

fn loader(payload: Payload<'_>) -> TestLoader<'_> {
    loader_with(
        RecordingBus::new(),
        old_flash(),
        payload,
        BootConfig::default(),
    )
}

/// What the panel shows after rendering `text` alone.
fn screen(text: &str) -> Framebuffer {
    let mut d = Display::new(RecordingBus::new(), RecordingPin::default());
    d.draw_string(text).unwrap();
    d.framebuffer().clone()
}

fn image() -> Vec<u8> {
    (0..150u32).map(|i| (i * 7 + 3) as u8).collect()
}

fn flash_ops(flash: &SimFlash) -> usize {
    flash.count(|e| matches!(e, FlashEvent::Erase(_) | FlashEvent::Program(..)))
}

// =============================================================================
// Stage transition tests
// =============================================================================

#[test]
fn test_stage_order_with_verify() {
    let mut stage = Stage::Banner;
    let mut seen = vec![stage];
    while !stage.is_terminal() {
        stage = stage.next(true);
        seen.push(stage);
    }
    assert_eq!(
        seen,
        vec![
            Stage::Banner,
            Stage::WaitConfirm1,
            Stage::ChecksumDisplay,
            Stage::WaitConfirm2,
            Stage::Erase,
            Stage::Program,
            Stage::Verify,
            Stage::Done,
        ]
    );
}

#[test]
fn test_program_goes_straight_to_done_without_verify() {
    assert_eq!(Stage::Program.next(false), Stage::Done);
}

#[test]
fn test_terminal_stages_are_absorbing() {
    assert_eq!(Stage::Done.next(true), Stage::Done);
    let halted = Stage::Halted(Error::EmptyPayload);
    assert_eq!(halted.next(true), halted);
    assert!(halted.is_terminal());
    assert!(!Stage::Verify.is_terminal());
}

// =============================================================================
// wait_for_confirm tests
// =============================================================================

#[test]
fn test_confirm_waits_for_press_then_release() {
    let mut button = ScriptedButton::new(&[true, true, true, false, false, true]);
    let mut delay = CountingDelay::default();
    wait_for_confirm(&mut button, &mut delay, 1);
    assert!(button.exhausted());
    assert_eq!(button.reads, 6);
    assert_eq!(delay.total_ms(), 4);
}

#[test]
fn test_confirm_does_not_return_while_held() {
    let mut button = ScriptedButton::new(&[false, false, false, false, true, false]);
    wait_for_confirm(&mut button, &mut CountingDelay::default(), 1);
    // The trailing low sample belongs to the next press.
    assert_eq!(button.reads, 5);
    assert!(!button.exhausted());
}

// =============================================================================
// Successful run tests
// =============================================================================

#[test]
fn test_run_programs_payload() {
    let bytes = image();
    let mut bl = loader(Payload::new(&bytes, BASE));

    assert_eq!(bl.run(), Ok(()));
    assert_eq!(bl.stage(), Stage::Done);
    assert_eq!(bl.checksum(), Some(crc32(0, &bytes)));
    assert_eq!(bl.flash().bytes(BASE, bytes.len()), bytes.as_slice());
    // The rest of the region is left erased.
    let tail = bl.flash().bytes(BASE + bytes.len() as u32 + 2, 100);
    assert!(tail.iter().all(|&b| b == 0xFF));
    assert_eq!(bl.display().framebuffer(), &screen(DONE));
}

#[test]
fn test_run_erases_whole_region_before_programming() {
    let bytes = [0x42u8; 10];
    let mut bl = loader(Payload::new(&bytes, BASE));
    bl.run().unwrap();

    let events = &bl.flash().events;
    let erases: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            FlashEvent::Erase(addr) => Some(*addr),
            _ => None,
        })
        .collect();
    assert_eq!(erases, vec![BASE, BASE + 64, BASE + 128, BASE + 192]);

    let last_erase = events
        .iter()
        .rposition(|e| matches!(e, FlashEvent::Erase(_)))
        .unwrap();
    let first_program = events
        .iter()
        .position(|e| matches!(e, FlashEvent::Program(..)))
        .unwrap();
    assert!(last_erase < first_program);
    assert_eq!(
        bl.flash().count(|e| matches!(e, FlashEvent::Program(..))),
        3
    );
}

#[test]
fn test_matching_expected_crc_is_accepted() {
    let bytes = image();
    let payload = Payload::new(&bytes, BASE).with_expected_crc(crc32(0, &bytes));
    let mut bl = loader(payload);
    assert_eq!(bl.run(), Ok(()));
}

#[test]
fn test_step_walks_every_stage() {
    let bytes = image();
    let mut bl = loader(Payload::new(&bytes, BASE));

    assert_eq!(bl.step(), Stage::WaitConfirm1);
    assert_eq!(bl.display().framebuffer(), &screen(PROMPT));
    assert_eq!(bl.step(), Stage::ChecksumDisplay);
    assert_eq!(bl.step(), Stage::WaitConfirm2);
    let hex = tinyflash_common::to_hex(crc32(0, &bytes));
    assert_eq!(bl.display().framebuffer(), &screen(&hex));
    assert_eq!(bl.step(), Stage::Erase);
    assert_eq!(flash_ops(bl.flash()), 0);
    assert_eq!(bl.step(), Stage::Program);
    assert_eq!(bl.step(), Stage::Verify);
    assert_eq!(bl.step(), Stage::Done);
    assert_eq!(bl.step(), Stage::Done);
}

#[test]
fn test_screens_are_distinct() {
    assert_ne!(screen(TITLE), screen(PROMPT));
    assert_ne!(screen(CHECKING), screen(DONE));
}

#[test]
fn test_left_handed_config_mirrors_panel() {
    let bytes = image();
    let config = BootConfig {
        left_handed: true,
        ..BootConfig::default()
    };
    let mut bl = loader_with(RecordingBus::new(), old_flash(), Payload::new(&bytes, BASE), config);
    bl.run().unwrap();
    assert_eq!(bl.display().column_offset(), 0);
}

// =============================================================================
// Failure tests
// =============================================================================

#[test]
fn test_checksum_mismatch_halts_before_erase() {
    let bytes = image();
    let payload = Payload::new(&bytes, BASE).with_expected_crc(0x1234_5678);
    let mut bl = loader(payload);

    let actual = crc32(0, &bytes);
    assert_eq!(
        bl.run(),
        Err(Error::ChecksumMismatch {
            expected: 0x1234_5678,
            actual
        })
    );
    assert!(bl.flash().events.is_empty());
    assert_eq!(bl.display().framebuffer(), &screen("E:CRC"));
}

/// Delay spent in the checksum stage alone.
fn checksum_stage_ms(bl: &mut TestLoader<'_>) -> u64 {
    while bl.stage() != Stage::ChecksumDisplay {
        bl.step();
    }
    let before = bl.delay().total_ms();
    bl.step();
    bl.delay().total_ms() - before
}

#[test]
fn test_checksum_mismatch_holds_computed_value() {
    let bytes = image();
    let hold = BootConfig::default().banner_hold_ms as u64;

    let mut good = loader(Payload::new(&bytes, BASE).with_expected_crc(crc32(0, &bytes)));
    assert_eq!(checksum_stage_ms(&mut good), hold);

    let mut bad = loader(Payload::new(&bytes, BASE).with_expected_crc(0x1234_5678));
    assert_eq!(checksum_stage_ms(&mut bad), 2 * hold);
    assert!(matches!(bad.stage(), Stage::Halted(Error::ChecksumMismatch { .. })));
}

#[test]
fn test_erase_failure_never_programs() {
    let bytes = image();
    let mut flash = old_flash();
    flash.fail_erase_at = Some((BASE + 64, FlashFault::WriteProtected));
    let mut bl = loader_with(
        RecordingBus::new(),
        flash,
        Payload::new(&bytes, BASE),
        BootConfig::default(),
    );

    assert_eq!(
        bl.run(),
        Err(Error::EraseFailed {
            address: BASE + 64,
            fault: FlashFault::WriteProtected
        })
    );
    assert_eq!(
        bl.flash().count(|e| matches!(e, FlashEvent::Program(..))),
        0
    );
    assert!(!bl.flash().unlocked);
    assert_eq!(bl.display().framebuffer(), &screen("E:ERASE"));
}

#[test]
fn test_program_failure_halts() {
    let bytes = image();
    let mut flash = old_flash();
    flash.fail_program_at = Some((BASE + 16, FlashFault::ProgrammingError));
    let mut bl = loader_with(
        RecordingBus::new(),
        flash,
        Payload::new(&bytes, BASE),
        BootConfig::default(),
    );

    assert!(matches!(
        bl.run(),
        Err(Error::ProgramFailed { address, .. }) if address == BASE + 16
    ));
    assert_eq!(bl.display().framebuffer(), &screen("E:PROG"));
}

#[test]
fn test_verify_catches_corrupted_word() {
    let bytes = image();
    let mut flash = old_flash();
    flash.corrupt_at = Some((BASE + 32, 0x8000_0000));
    let mut bl = loader_with(
        RecordingBus::new(),
        flash,
        Payload::new(&bytes, BASE),
        BootConfig::default(),
    );

    assert!(matches!(
        bl.run(),
        Err(Error::VerifyMismatch { address, .. }) if address == BASE + 32
    ));
}

#[test]
fn test_verify_disabled_skips_read_back() {
    let bytes = image();
    let mut flash = old_flash();
    flash.corrupt_at = Some((BASE + 32, 0x8000_0000));
    let config = BootConfig {
        verify: false,
        ..BootConfig::default()
    };
    let mut bl = loader_with(RecordingBus::new(), flash, Payload::new(&bytes, BASE), config);
    assert_eq!(bl.run(), Ok(()));
}

#[test]
fn test_empty_payload_is_rejected_before_erase() {
    let mut bl = loader(Payload::new(&[], BASE));
    assert_eq!(bl.run(), Err(Error::EmptyPayload));
    assert_eq!(bl.checksum(), Some(0));
    assert_eq!(flash_ops(bl.flash()), 0);
}

#[test]
fn test_oversized_payload_is_rejected_before_erase() {
    let bytes = vec![0u8; REGION_SIZE as usize + 1];
    let mut bl = loader(Payload::new(&bytes, BASE));
    assert_eq!(
        bl.run(),
        Err(Error::PayloadTooLarge {
            len: REGION_SIZE as usize + 1,
            capacity: REGION_SIZE
        })
    );
    assert_eq!(flash_ops(bl.flash()), 0);
    assert_eq!(bl.display().framebuffer(), &screen("E:SIZE"));
}

#[test]
fn test_payload_outside_region_is_rejected() {
    let bytes = image();
    let mut bl = loader(Payload::new(&bytes, BASE + PAGE));
    assert_eq!(bl.run(), Err(Error::InvalidRegion));
    assert_eq!(flash_ops(bl.flash()), 0);
}

#[test]
fn test_display_failure_halts_at_banner() {
    let bytes = image();
    let mut bl = loader_with(
        RecordingBus::failing_after(0, Error::BusTimeout),
        old_flash(),
        Payload::new(&bytes, BASE),
        BootConfig::default(),
    );

    assert_eq!(bl.run(), Err(Error::BusTimeout));
    assert_eq!(bl.stage(), Stage::Halted(Error::BusTimeout));
    assert!(bl.flash().events.is_empty());
}

#[test]
fn test_display_failure_after_programming_is_reported() {
    let bytes = [0x99u8; 8];
    // init + 4 screens of 4 writes each succeed, then "Done!" fails.
    let mut bl = loader_with(
        RecordingBus::failing_after(1 + 4 * 4, Error::BusNack),
        old_flash(),
        Payload::new(&bytes, BASE),
        BootConfig::default(),
    );

    assert_eq!(bl.run(), Err(Error::BusNack));
    assert_eq!(bl.flash().bytes(BASE, 8), &bytes);
}
