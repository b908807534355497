// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side copy of the panel's two 96-column pages.
//!
//! Each byte is a vertical 8-pixel slice, bit 0 at the top. Drawing only
//! touches this buffer; nothing reaches the panel until the display syncs.

use crate::error::Error;
use crate::layout::{COLUMNS, PAGES};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pages: [[u8; COLUMNS]; PAGES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; COLUMNS]; PAGES],
        }
    }

    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Contents of page `index`, `None` past the last page.
    pub fn page(&self, index: usize) -> Option<&[u8; COLUMNS]> {
        self.pages.get(index)
    }

    /// Copy a `width` x `height` bitmap to column `x` of the page band at `y`.
    ///
    /// Only the shapes the panel text and strip drawing use are accepted:
    /// - `height == 8` with `y == 0` (page 0) or `y == 8` (page 1)
    /// - `height == 16` with `y == 0` (both pages)
    ///
    /// The bitmap holds one row of `width` column bytes per page, page 0
    /// first. Anything that would land outside the buffer is an
    /// [`Error::OutOfBounds`] and leaves the buffer untouched.
    pub fn draw_area(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        bitmap: &[u8],
    ) -> Result<(), Error> {
        let first_page = match (y, height) {
            (0, 8) | (0, 16) => 0,
            (8, 8) => 1,
            _ => return Err(Error::OutOfBounds),
        };
        let lines = height / 8;
        let end = x.checked_add(width).ok_or(Error::OutOfBounds)?;
        if width == 0 || end > COLUMNS || bitmap.len() < width * lines {
            return Err(Error::OutOfBounds);
        }

        for (line, row) in bitmap.chunks_exact(width).take(lines).enumerate() {
            self.pages[first_page + line][x..end].copy_from_slice(row);
        }
        Ok(())
    }
}
