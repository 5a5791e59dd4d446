//! Page-organized frame buffer and addressing regions.
//!
//! The buffer stages exactly the bytes of the next transfer, laid out the way
//! the controller consumes them in horizontal addressing mode: column-major
//! within a page, pages top to bottom, bit 0 of every byte on top. Draw
//! operations compose region-local content at the start of the buffer and
//! record the matching addressing window in a [`FrameRegion`].

use core::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::config::{FRAME_BYTES, PAGE_HEIGHT, SCREEN_PAGES, SCREEN_WIDTH};

/// Rectangular addressing window plus the byte count of the staged content.
///
/// Overwritten before each transfer request; valid only until the
/// corresponding transfer completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct FrameRegion {
    /// First and last column, inclusive.
    pub columns: [u8; 2],
    /// First and last page, inclusive.
    pub pages: [u8; 2],
    /// Number of staged bytes.
    pub len: usize,
}

impl FrameRegion {
    /// Region covering `width` columns and `page_count` pages.
    #[must_use]
    pub const fn new(
        first_column: usize,
        width: usize,
        first_page: usize,
        page_count: usize,
    ) -> Self {
        Self {
            columns: [first_column as u8, (first_column + width - 1) as u8],
            pages: [first_page as u8, (first_page + page_count - 1) as u8],
            len: width * page_count,
        }
    }

    /// The whole display.
    #[must_use]
    pub const fn full_screen() -> Self {
        Self::new(0, SCREEN_WIDTH, 0, SCREEN_PAGES)
    }
}

/// Fixed-size staging buffer for the next transfer.
pub struct Frame {
    bytes: [u8; FRAME_BYTES],
}

impl Frame {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
        }
    }

    /// Blank the whole buffer.
    pub fn clear(&mut self) { self.bytes = [0; FRAME_BYTES]; }

    /// The first `len` staged bytes.
    #[must_use]
    pub fn staged(
        &self,
        len: usize,
    ) -> &[u8] {
        &self.bytes[..len]
    }

    /// Copy raw page-organized bytes to `offset`.
    pub fn blit(
        &mut self,
        offset: usize,
        data: &[u8],
    ) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Fill `len` bytes at `offset` with one value.
    pub fn fill(
        &mut self,
        offset: usize,
        len: usize,
        value: u8,
    ) {
        self.bytes[offset..offset + len].fill(value);
    }

    /// An `embedded-graphics` canvas over a region-local area at the start
    /// of the buffer, `width` columns wide and `page_count` pages tall.
    pub fn canvas(
        &mut self,
        width: usize,
        page_count: usize,
    ) -> RegionCanvas<'_> {
        RegionCanvas {
            bytes: &mut self.bytes[..width * page_count],
            width,
            height: page_count * PAGE_HEIGHT,
        }
    }
}

impl Default for Frame {
    fn default() -> Self { Self::new() }
}

/// Draw target writing 1-bit pixels into a page-organized byte area.
pub struct RegionCanvas<'a> {
    bytes: &'a mut [u8],
    width: usize,
    height: usize,
}

impl RegionCanvas<'_> {
    fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        on: bool,
    ) {
        if x < 0 || x >= self.width as i32 || y < 0 || y >= self.height as i32 {
            return;
        }
        let index = (y as usize / PAGE_HEIGHT) * self.width + x as usize;
        let mask = 1u8 << (y as usize % PAGE_HEIGHT);
        if on {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
    }
}

impl OriginDimensions for RegionCanvas<'_> {
    fn size(&self) -> Size { Size::new(self.width as u32, self.height as u32) }
}

impl DrawTarget for RegionCanvas<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
