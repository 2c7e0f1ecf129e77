//! Text rendering with the built-in 5x7 font.
//!
//! Text is drawn onto any [`Canvas`] in 6×8 pixel cells (glyph plus one
//! spacing column and the glyph's empty bottom row), multiplied by the
//! cursor's scale factor. Rendering state lives in a [`TextCursor`] value
//! that is passed in and handed back, so there is no hidden text state.
//!
//! # Example
//!
//! ```ignore
//! let cursor = TextCursor::default();
//! let cursor = text::print(&mut framebuffer, cursor, "Hello\nWorld");
//! assert_eq!((cursor.x, cursor.y), (30, 8));
//! ```

use core::fmt;

use crate::font::{self, GLYPH_COLUMNS};
use crate::framebuffer::Color;
use crate::raster::Canvas;

/// Horizontal advance per character at scale 1 (glyph + spacing column).
pub const CELL_WIDTH: i32 = GLYPH_COLUMNS as i32 + 1;

/// Vertical advance per line at scale 1 (7 glyph rows + spacing row).
pub const LINE_HEIGHT: i32 = 8;

// ── TextCursor ───────────────────────────────────────────────────────────

/// Position and style for the next character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextCursor {
    /// Left edge of the next glyph cell.
    pub x: i32,
    /// Top edge of the next glyph cell.
    pub y: i32,
    /// Integer scale factor. 0 is treated as 1.
    pub size: u8,
    /// Foreground color for set glyph bits.
    pub color: Color,
    /// Color for unset glyph bits. `None` (or equal to `color`) leaves them
    /// untouched.
    pub background: Option<Color>,
    /// Move to the next line when a glyph would cross the right edge.
    pub wrap: bool,
}

impl Default for TextCursor {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            size: 1,
            color: Color::On,
            background: None,
            wrap: true,
        }
    }
}

impl TextCursor {
    /// Effective scale factor (never below 1).
    pub fn scale(&self) -> i32 {
        i32::from(self.size.max(1))
    }

    /// Same style, moved to `(x, y)`.
    pub fn at(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    fn new_line(&mut self) {
        self.x = 0;
        self.y = self.y.saturating_add(LINE_HEIGHT * self.scale());
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Draw one glyph with its top-left corner at `(x, y)`.
///
/// Uses the style fields of `style` (`size`, `color`, `background`); its
/// position is ignored. Pixels outside the canvas are clipped.
pub fn draw_char<C>(canvas: &mut C, x: i32, y: i32, ch: char, style: &TextCursor)
where
    C: Canvas + ?Sized,
{
    let scale = style.scale();
    let background = style.background.filter(|bg| *bg != style.color);

    for (col, bits) in font::glyph(ch).iter().enumerate() {
        let px = x.saturating_add(col as i32 * scale);
        for row in 0..LINE_HEIGHT {
            let py = y.saturating_add(row * scale);
            if bits & (1 << row) != 0 {
                canvas.fill_rect(px, py, scale, scale, style.color);
            } else if let Some(bg) = background {
                canvas.fill_rect(px, py, scale, scale, bg);
            }
        }
    }
}

/// Render `text` starting at the cursor and return the advanced cursor.
///
/// * `'\n'` moves to the start of the next line, `'\r'` to the start of
///   the current one.
/// * With `wrap` set, a glyph whose cell would cross the right edge is
///   moved to the next line first.
/// * Rendering stops once the cursor is below the canvas.
pub fn print<C>(canvas: &mut C, mut cursor: TextCursor, text: &str) -> TextCursor
where
    C: Canvas + ?Sized,
{
    let (width, height) = canvas.bounds();
    let advance = CELL_WIDTH * cursor.scale();

    for ch in text.chars() {
        if cursor.y >= height {
            break;
        }

        match ch {
            '\n' => cursor.new_line(),
            '\r' => cursor.x = 0,
            _ => {
                if cursor.wrap && cursor.x > 0 && cursor.x.saturating_add(advance) > width {
                    cursor.new_line();
                    if cursor.y >= height {
                        break;
                    }
                }
                draw_char(canvas, cursor.x, cursor.y, ch, &cursor);
                cursor.x = cursor.x.saturating_add(advance);
            }
        }
    }

    cursor
}

// ── fmt::Write adapter ───────────────────────────────────────────────────

/// [`fmt::Write`] sink that prints onto a canvas.
///
/// Lets `write!` render formatted values without an intermediate buffer.
pub struct TextWriter<'a, C: ?Sized> {
    canvas: &'a mut C,
    cursor: TextCursor,
}

impl<'a, C> TextWriter<'a, C>
where
    C: Canvas + ?Sized,
{
    pub fn new(canvas: &'a mut C, cursor: TextCursor) -> Self {
        Self { canvas, cursor }
    }

    /// Cursor after everything written so far.
    pub fn into_cursor(self) -> TextCursor {
        self.cursor
    }
}

impl<C> fmt::Write for TextWriter<'_, C>
where
    C: Canvas + ?Sized,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cursor = print(self.canvas, self.cursor, s);
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
