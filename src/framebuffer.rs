//! In-memory mirror of the SSD1306 display RAM.
//!
//! The controller organises its RAM in **pages** of 8 vertically stacked
//! rows. Byte `page * width + x` holds column `x` of that page, and bit
//! `b` of the byte (bit 0 = top) is pixel `(x, page * 8 + b)`:
//!
//! ```text
//!            x=0      x=1            x=width-1
//! page 0   [byte 0] [byte 1]  ...  [byte w-1]      rows 0..8
//! page 1   [byte w] [byte w+1] ... [byte 2w-1]     rows 8..16
//!   ...
//! ```
//!
//! [`Framebuffer::as_bytes`] is exactly the stream sent to the panel in
//! horizontal addressing mode.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use embedded_hal_async::i2c::I2c;

use crate::command;
use crate::config::DisplaySize;
use crate::error::OledError;
use crate::raster::Canvas;
use crate::transport::I2cTransport;

/// Backing store size: the largest supported geometry (128×64).
pub const MAX_BUFFER_LEN: usize = 1024;

// ── Color ────────────────────────────────────────────────────────────────

/// Pixel operation for a monochrome panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Clear the pixel (black).
    Off,
    /// Set the pixel (white).
    On,
    /// Flip the pixel's current state.
    Invert,
}

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        match color {
            BinaryColor::Off => Color::Off,
            BinaryColor::On => Color::On,
        }
    }
}

// ── DirtyRegion ──────────────────────────────────────────────────────────

/// Bounding box of framebuffer bytes modified since the last present.
///
/// Expressed in controller units (columns and pages, both inclusive) so it
/// maps directly onto the column/page address window commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyRegion {
    pub first_column: u32,
    pub last_column: u32,
    pub first_page: u32,
    pub last_page: u32,
}

impl DirtyRegion {
    fn single(column: u32, page: u32) -> Self {
        Self {
            first_column: column,
            last_column: column,
            first_page: page,
            last_page: page,
        }
    }

    fn include(&mut self, column: u32, page: u32) {
        self.first_column = self.first_column.min(column);
        self.last_column = self.last_column.max(column);
        self.first_page = self.first_page.min(page);
        self.last_page = self.last_page.max(page);
    }
}

// ── Framebuffer ──────────────────────────────────────────────────────────

/// One bit per pixel, packed in the controller's page layout.
///
/// The logical length is fixed by the [`DisplaySize`] at construction and
/// never changes. Every coordinate is bounds-checked before a bit is
/// touched; out-of-range writes are ignored and out-of-range reads return
/// `false`.
#[derive(Clone)]
pub struct Framebuffer {
    size: DisplaySize,
    bytes: [u8; MAX_BUFFER_LEN],
    dirty: Option<DirtyRegion>,
}

impl Framebuffer {
    /// Allocate a cleared framebuffer for `size`.
    ///
    /// Nothing is marked dirty: the buffer matches a freshly cleared panel
    /// only after the first present.
    pub fn new(size: DisplaySize) -> Self {
        Self {
            size,
            bytes: [0; MAX_BUFFER_LEN],
            dirty: None,
        }
    }

    /// Geometry this buffer was created for.
    pub fn display_size(&self) -> DisplaySize {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Packed bytes in transmission order; length `pages * width`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size.buffer_len()]
    }

    /// Number of bytes in [`as_bytes`](Self::as_bytes).
    pub fn len(&self) -> usize {
        self.size.buffer_len()
    }

    /// Always `false`: every supported geometry has pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turn every pixel off and mark the whole buffer dirty.
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Set every pixel to `on` and mark the whole buffer dirty.
    pub fn fill(&mut self, on: bool) {
        let len = self.len();
        self.bytes[..len].fill(if on { 0xFF } else { 0x00 });
        self.dirty = Some(self.full_region());
    }

    /// Apply `color` to the pixel at `(x, y)`.
    ///
    /// Out-of-range coordinates are a silent no-op.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some((index, mask)) = self.locate(x, y) else {
            return;
        };

        match color {
            Color::On => self.bytes[index] |= mask,
            Color::Off => self.bytes[index] &= !mask,
            Color::Invert => self.bytes[index] ^= mask,
        }

        let (column, page) = (x as u32, y as u32 / 8);
        match self.dirty.as_mut() {
            Some(region) => region.include(column, page),
            None => self.dirty = Some(DirtyRegion::single(column, page)),
        }
    }

    /// Read the pixel at `(x, y)`; `false` when out of range.
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .is_some_and(|(index, mask)| self.bytes[index] & mask != 0)
    }

    /// Region modified since the last present, if any.
    pub fn dirty_region(&self) -> Option<DirtyRegion> {
        self.dirty
    }

    /// Whether anything changed since the last present.
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Byte index and bit mask for an in-range pixel.
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        let width = self.width() as i32;
        let height = self.height() as i32;
        if x < 0 || y < 0 || x >= width || y >= height {
            return None;
        }

        let index = (y / 8 * width + x) as usize;
        Some((index, 1 << (y % 8)))
    }

    fn full_region(&self) -> DirtyRegion {
        DirtyRegion {
            first_column: 0,
            last_column: self.width() - 1,
            first_page: 0,
            last_page: self.size.pages() - 1,
        }
    }

    // ── Presenting ───────────────────────────────────────────────────

    /// Transfer the whole buffer to the panel.
    ///
    /// Resets the controller's column and page window to the full panel
    /// (which also rewinds its RAM pointer to the origin), then streams
    /// every byte in data mode. The dirty region is cleared on success.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::TransferFailure`] if any write fails. The panel
    /// may then show a partial frame; the dirty region is kept.
    pub async fn present<I2C>(&mut self, transport: &mut I2cTransport<I2C>) -> Result<(), OledError>
    where
        I2C: I2c,
    {
        let window = self.full_region();
        transport.command(&address_window(&window)).await?;
        transport.data(self.as_bytes()).await?;
        self.dirty = None;
        Ok(())
    }

    /// Transfer only the bytes inside the dirty region.
    ///
    /// Narrows the controller's address window to the region, then sends
    /// each page's slice of it in order. Does nothing when the buffer is
    /// clean.
    ///
    /// # Errors
    ///
    /// Same as [`present`](Self::present).
    pub async fn present_dirty<I2C>(
        &mut self,
        transport: &mut I2cTransport<I2C>,
    ) -> Result<(), OledError>
    where
        I2C: I2c,
    {
        let Some(region) = self.dirty else {
            return Ok(());
        };

        transport.command(&address_window(&region)).await?;

        let width = self.width() as usize;
        for page in region.first_page..=region.last_page {
            let row = page as usize * width;
            let start = row + region.first_column as usize;
            let end = row + region.last_column as usize;
            transport.data(&self.bytes[start..=end]).await?;
        }

        self.dirty = None;
        Ok(())
    }
}

/// Column and page window commands covering `region`.
fn address_window(region: &DirtyRegion) -> [u8; 6] {
    [
        command::COLUMN_ADDR,
        region.first_column as u8,
        region.last_column as u8,
        command::PAGE_ADDR,
        region.first_page as u8,
        region.last_page as u8,
    ]
}

// ── Canvas / embedded-graphics integration ──────────────────────────────

impl Canvas for Framebuffer {
    fn bounds(&self) -> (i32, i32) {
        (self.width() as i32, self.height() as i32)
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel(x, y, color);
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.into());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.is_on());
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeBus;
    use embassy_futures::block_on;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    fn fb() -> Framebuffer {
        Framebuffer::new(DisplaySize::Size128x64)
    }

    fn lit(fb: &Framebuffer) -> usize {
        fb.as_bytes().iter().map(|b| b.count_ones() as usize).sum()
    }

    #[test]
    fn set_then_get_every_pixel() {
        let mut fb = Framebuffer::new(DisplaySize::Size128x32);
        for y in 0..32 {
            for x in 0..128 {
                fb.set_pixel(x, y, Color::On);
                assert!(fb.get_pixel(x, y), "({}, {}) should be on", x, y);
            }
        }
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut fb = fb();
        fb.set_pixel(3, 3, Color::On);
        fb.set_pixel(127, 63, Color::On);
        fb.clear();
        for y in 0..64 {
            for x in 0..128 {
                assert!(!fb.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn pixel_maps_to_page_column_and_bit() {
        let mut fb = fb();
        fb.set_pixel(0, 0, Color::On);
        assert_eq!(fb.as_bytes()[0], 0b0000_0001);

        fb.set_pixel(64, 32, Color::On);
        // Page 4, column 64, bit 0.
        assert_eq!(fb.as_bytes()[4 * 128 + 64], 0b0000_0001);

        fb.set_pixel(5, 15, Color::On);
        // Page 1, column 5, bit 7.
        assert_eq!(fb.as_bytes()[128 + 5], 0b1000_0000);
    }

    #[test]
    fn off_and_invert() {
        let mut fb = fb();
        fb.set_pixel(10, 10, Color::Invert);
        assert!(fb.get_pixel(10, 10));
        fb.set_pixel(10, 10, Color::Invert);
        assert!(!fb.get_pixel(10, 10));
        fb.set_pixel(10, 10, Color::On);
        fb.set_pixel(10, 10, Color::Off);
        assert!(!fb.get_pixel(10, 10));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut fb = fb();
        fb.set_pixel(-1, 1000, Color::On);
        fb.set_pixel(128, 0, Color::On);
        fb.set_pixel(0, 64, Color::On);
        fb.set_pixel(i32::MIN, i32::MAX, Color::Invert);

        assert_eq!(fb.as_bytes().len(), 1024);
        assert_eq!(lit(&fb), 0);
        assert!(!fb.is_dirty());
        assert!(!fb.get_pixel(-1, 0));
        assert!(!fb.get_pixel(0, 64));
    }

    #[test]
    fn buffer_length_follows_geometry() {
        assert_eq!(Framebuffer::new(DisplaySize::Size128x32).len(), 512);
        assert_eq!(Framebuffer::new(DisplaySize::Size96x16).as_bytes().len(), 192);
    }

    #[test]
    fn dirty_region_grows_to_cover_writes() {
        let mut fb = fb();
        assert_eq!(fb.dirty_region(), None);

        fb.set_pixel(10, 20, Color::On);
        fb.set_pixel(40, 3, Color::On);
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                first_column: 10,
                last_column: 40,
                first_page: 0,
                last_page: 2,
            })
        );

        fb.clear();
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                first_column: 0,
                last_column: 127,
                first_page: 0,
                last_page: 7,
            })
        );
    }

    #[test]
    fn present_sends_window_then_packed_buffer() {
        let mut fb = fb();
        fb.set_pixel(0, 0, Color::On);
        fb.set_pixel(127, 63, Color::On);

        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 32);
        block_on(fb.present(&mut t)).unwrap();

        let bus = t.bus();
        assert_eq!(bus.command_bytes(), [0x21, 0, 127, 0x22, 0, 7]);
        assert_eq!(bus.data_bytes(), fb.as_bytes());
        assert_eq!(bus.data_bytes()[0] & 0x01, 0x01);
        assert_eq!(bus.data_writes(), 1024 / 32);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn present_uses_panel_window_for_short_panels() {
        let mut fb = Framebuffer::new(DisplaySize::Size96x16);
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 128);
        block_on(fb.present(&mut t)).unwrap();
        assert_eq!(t.bus().command_bytes(), [0x21, 0, 95, 0x22, 0, 1]);
        assert_eq!(t.bus().data_bytes().len(), 192);
    }

    #[test]
    fn failed_present_keeps_dirty_region() {
        let mut fb = fb();
        fb.set_pixel(1, 1, Color::On);

        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 64);
        // Command write succeeds, the third data chunk fails.
        t.bus_mut().fail_on_write(3, embedded_hal_async::i2c::ErrorKind::Bus);
        let result = block_on(fb.present(&mut t));

        assert!(matches!(result, Err(OledError::TransferFailure(_))));
        assert!(fb.is_dirty());
    }

    #[test]
    fn present_dirty_sends_only_the_window() {
        let mut fb = fb();
        fb.set_pixel(10, 8, Color::On);
        fb.set_pixel(12, 23, Color::On);

        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 128);
        block_on(fb.present_dirty(&mut t)).unwrap();

        let bus = t.bus();
        assert_eq!(bus.command_bytes(), [0x21, 10, 12, 0x22, 1, 2]);
        // Page 1 then page 2, columns 10..=12 each.
        assert_eq!(bus.data_bytes(), [0x01, 0x00, 0x00, 0x00, 0x00, 0x80]);
        assert!(!fb.is_dirty());
    }

    #[test]
    fn present_dirty_on_clean_buffer_is_silent() {
        let mut fb = fb();
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 128);
        block_on(fb.present_dirty(&mut t)).unwrap();
        assert!(t.bus().writes.is_empty());
    }

    #[test]
    fn draws_embedded_graphics_primitives() {
        let mut fb = fb();
        Rectangle::new(Point::new(2, 2), Size::new(4, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(lit(&fb), 12);
        assert!(fb.get_pixel(2, 2));
        assert!(fb.get_pixel(5, 4));
        assert!(!fb.get_pixel(6, 4));
        assert_eq!(OriginDimensions::size(&fb), Size::new(128, 64));
    }

    #[test]
    fn draw_target_clear_fills_buffer() {
        let mut fb = Framebuffer::new(DisplaySize::Size96x16);
        DrawTarget::clear(&mut fb, BinaryColor::On).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
        assert!(fb.get_pixel(95, 15));
    }
}
