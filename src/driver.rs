//! Session-oriented SSD1306 driver.
//!
//! [`OledDriver`] ties the transport, framebuffer, text cursor and scroll
//! state together behind one lifecycle: construction without I2C traffic,
//! an explicit async [`begin()`](OledDriver::begin) that probes and
//! initialises the panel, drawing into RAM, and explicit presents.

use core::fmt::{self, Write as _};

use embedded_hal_async::i2c::I2c;

use crate::command;
use crate::config::{DisplayConfig, DisplaySize};
use crate::error::OledError;
use crate::framebuffer::{Color, Framebuffer};
use crate::raster::Canvas;
use crate::scroll::{ScrollController, ScrollInterval, ScrollMode, ScrollState};
use crate::text::{self, TextCursor, TextWriter};
use crate::transport::I2cTransport;

/// State that exists only between `begin()` and `end()`.
struct Session {
    framebuffer: Framebuffer,
    cursor: TextCursor,
    scroll: ScrollController,
    contrast: u8,
    inverted: bool,
    dimmed: bool,
}

impl Session {
    fn new(size: DisplaySize, contrast: u8) -> Self {
        // Panel RAM is undefined after init; the first present of either
        // kind must cover all of it.
        let mut framebuffer = Framebuffer::new(size);
        framebuffer.clear();

        Self {
            framebuffer,
            cursor: TextCursor::default(),
            scroll: ScrollController::new(),
            contrast,
            inverted: false,
            dimmed: false,
        }
    }
}

/// Async driver for an SSD1306 OLED panel over I2C.
///
/// # Lifecycle
///
/// 1. [`OledDriver::new()`]: constructs the driver without any I2C traffic.
/// 2. [`OledDriver::begin()`]: probes the device and sends the
///    initialisation sequence.
/// 3. Draw into the framebuffer with the drawing and text methods, or via
///    [`canvas_mut()`](Self::canvas_mut) and `embedded-graphics`.
/// 4. [`OledDriver::display()`]: transfers the framebuffer to the panel.
/// 5. [`OledDriver::end()`]: switches the panel off and closes the session.
///
/// Every operation other than `new`, `begin`, `end`, `release` and the
/// geometry queries returns [`OledError::NotInitialized`] outside a session,
/// without touching memory or the bus.
///
/// # Example
///
/// ```no_run
/// use embedded_hal_async::i2c::I2c;
/// use oled_display_rs::{Color, DisplayConfig, OledDriver, OledError};
///
/// # async fn example(i2c: impl I2c) -> Result<(), OledError> {
/// let mut oled = OledDriver::new(i2c, DisplayConfig::default());
/// oled.begin().await?;
/// oled.clear_display()?;
/// oled.draw_circle(64, 32, 20, Color::On)?;
/// oled.print("Hello")?;
/// oled.display().await?;
/// # Ok(())
/// # }
/// ```
pub struct OledDriver<I2C> {
    transport: I2cTransport<I2C>,
    config: DisplayConfig,
    /// `Some` while a session is open.
    session: Option<Session>,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c,
{
    /// Construct a closed driver.
    ///
    /// No I2C traffic is generated. You **must** call [`begin()`](Self::begin)
    /// before any display operations.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access).
    /// * `config`: panel address, geometry and power settings.
    pub fn new(i2c: I2C, config: DisplayConfig) -> Self {
        Self {
            transport: I2cTransport::new(i2c, config.address, config.max_chunk),
            config,
            session: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open a session: probe the device and initialise the panel.
    ///
    /// An already open session is ended first. On success the framebuffer
    /// is cleared (in RAM only) and marked fully dirty, the cursor is at
    /// the origin and scrolling is stopped.
    ///
    /// # Errors
    ///
    /// * [`OledError::InvalidGeometry`] if the configured size is unsupported.
    /// * [`OledError::DeviceNotFound`] if nothing acknowledges the address.
    /// * [`OledError::BusUnavailable`] on any other bus fault during the probe.
    /// * [`OledError::TransferFailure`] if the initialisation sequence fails.
    ///
    /// The driver is closed after any error.
    pub async fn begin(&mut self) -> Result<(), OledError> {
        if self.session.is_some() {
            self.end().await;
        }

        let size = self.config.size()?;

        if let Err(e) = self.transport.probe().await {
            #[cfg(feature = "defmt")]
            defmt::error!("OLED probe at {=u8:#x} failed: {}", self.config.address, e);
            return Err(e);
        }

        let contrast = self.config.initial_contrast();
        let init = command::init_sequence(size, self.config.vcc, contrast);
        // The probe already delivered the leading DISPLAY_OFF.
        self.transport.command(&init[1..]).await?;

        self.session = Some(Session::new(size, contrast));

        #[cfg(feature = "defmt")]
        defmt::info!(
            "OLED initialised: {}x{} at {=u8:#x}",
            size.width(),
            size.height(),
            self.config.address
        );

        Ok(())
    }

    /// Close the session and switch the panel off.
    ///
    /// Idempotent. The display-off command is best effort: a bus error is
    /// logged and otherwise ignored.
    pub async fn end(&mut self) {
        if self.session.take().is_none() {
            return;
        }

        if let Err(_e) = self.transport.command(&[command::DISPLAY_OFF]).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("OLED display-off failed: {}", _e);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("OLED session closed");
    }

    /// Give the I2C peripheral back to the caller.
    ///
    /// Generates no I2C traffic; call [`end()`](Self::end) first to switch
    /// the panel off.
    pub fn release(self) -> I2C {
        self.transport.release()
    }

    /// Whether a session is open.
    ///
    /// No I2C traffic is generated.
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Configured panel width, or 0 if the geometry is unsupported.
    pub fn width(&self) -> u32 {
        self.config.size().map_or(0, DisplaySize::width)
    }

    /// Configured panel height, or 0 if the geometry is unsupported.
    pub fn height(&self) -> u32 {
        self.config.size().map_or(0, DisplaySize::height)
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    fn session(&self) -> Result<&Session, OledError> {
        self.session.as_ref().ok_or(OledError::NotInitialized)
    }

    fn session_mut(&mut self) -> Result<&mut Session, OledError> {
        self.session.as_mut().ok_or(OledError::NotInitialized)
    }

    // ── Framebuffer ──────────────────────────────────────────────────

    /// Clear the framebuffer.
    ///
    /// Does **not** send any I2C traffic; the panel is unchanged until the
    /// next [`display()`](Self::display). The text cursor is kept.
    pub fn clear_display(&mut self) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.clear();
        Ok(())
    }

    /// Transfer the whole framebuffer to the panel.
    ///
    /// At 400 kHz I2C a full 1024-byte frame takes roughly 20 ms.
    ///
    /// # Errors
    ///
    /// [`OledError::TransferFailure`] on a bus error. The session stays
    /// open; the panel shows a partial frame until the next present.
    pub async fn display(&mut self) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        session.framebuffer.present(&mut self.transport).await
    }

    /// Transfer only the region changed since the last present.
    ///
    /// No bus traffic when nothing changed.
    pub async fn display_dirty(&mut self) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        session.framebuffer.present_dirty(&mut self.transport).await
    }

    /// Whether the framebuffer changed since the last present.
    ///
    /// `false` when no session is open.
    pub fn is_dirty(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.framebuffer.is_dirty())
    }

    /// Mutable framebuffer, usable as an `embedded-graphics` `DrawTarget`.
    pub fn canvas_mut(&mut self) -> Result<&mut Framebuffer, OledError> {
        Ok(&mut self.session_mut()?.framebuffer)
    }

    pub fn framebuffer(&self) -> Result<&Framebuffer, OledError> {
        Ok(&self.session()?.framebuffer)
    }

    // ── Drawing ──────────────────────────────────────────────────────

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.draw_pixel(x, y, color);
        Ok(())
    }

    /// Read back a framebuffer pixel; `false` when out of range.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<bool, OledError> {
        Ok(self.session()?.framebuffer.get_pixel(x, y))
    }

    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    ) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.draw_line(x0, y0, x1, y1, color);
        Ok(())
    }

    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    ) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.draw_rect(x, y, w, h, color);
        Ok(())
    }

    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    ) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.fill_rect(x, y, w, h, color);
        Ok(())
    }

    pub fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.draw_circle(cx, cy, r, color);
        Ok(())
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) -> Result<(), OledError> {
        self.session_mut()?.framebuffer.fill_circle(cx, cy, r, color);
        Ok(())
    }

    // ── Text ─────────────────────────────────────────────────────────

    pub fn set_cursor(&mut self, x: i32, y: i32) -> Result<(), OledError> {
        let session = self.session_mut()?;
        session.cursor = session.cursor.at(x, y);
        Ok(())
    }

    /// Current cursor position and text style.
    pub fn cursor(&self) -> Result<TextCursor, OledError> {
        Ok(self.session()?.cursor)
    }

    /// Set the text scale factor; 0 is stored as 1.
    pub fn set_text_size(&mut self, size: u8) -> Result<(), OledError> {
        self.session_mut()?.cursor.size = size.max(1);
        Ok(())
    }

    pub fn set_text_color(&mut self, color: Color) -> Result<(), OledError> {
        self.session_mut()?.cursor.color = color;
        Ok(())
    }

    /// Color for unset glyph bits; `None` leaves them untouched.
    pub fn set_text_background(&mut self, background: Option<Color>) -> Result<(), OledError> {
        self.session_mut()?.cursor.background = background;
        Ok(())
    }

    pub fn set_text_wrap(&mut self, wrap: bool) -> Result<(), OledError> {
        self.session_mut()?.cursor.wrap = wrap;
        Ok(())
    }

    /// Draw one character at `(x, y)` in the current text style.
    ///
    /// The cursor does not move.
    pub fn draw_char(&mut self, x: i32, y: i32, ch: char) -> Result<(), OledError> {
        let session = self.session_mut()?;
        text::draw_char(&mut session.framebuffer, x, y, ch, &session.cursor);
        Ok(())
    }

    /// Render `text` at the cursor and advance it.
    pub fn print(&mut self, text: &str) -> Result<(), OledError> {
        let session = self.session_mut()?;
        session.cursor = text::print(&mut session.framebuffer, session.cursor, text);
        Ok(())
    }

    /// Render formatted output at the cursor without allocating.
    ///
    /// ```ignore
    /// oled.print_fmt(format_args!("{} C", temperature))?;
    /// ```
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), OledError> {
        let session = self.session_mut()?;
        let mut writer = TextWriter::new(&mut session.framebuffer, session.cursor);
        // TextWriter never reports an error; a failing Display impl only
        // truncates the output.
        let _ = writer.write_fmt(args);
        session.cursor = writer.into_cursor();
        Ok(())
    }

    // ── Panel control ────────────────────────────────────────────────

    /// Store and apply a new contrast level. Clears the dimmed state.
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        session.contrast = contrast;
        session.dimmed = false;
        self.transport.command(&[command::SET_CONTRAST, contrast]).await
    }

    /// Contrast stored for the session (not affected by dimming).
    pub fn contrast(&self) -> Result<u8, OledError> {
        Ok(self.session()?.contrast)
    }

    /// Dim to contrast 0, or restore the stored contrast.
    pub async fn dim(&mut self, dim: bool) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        session.dimmed = dim;
        let level = if dim { 0 } else { session.contrast };
        self.transport.command(&[command::SET_CONTRAST, level]).await
    }

    pub fn is_dimmed(&self) -> Result<bool, OledError> {
        Ok(self.session()?.dimmed)
    }

    /// Switch between normal and inverse video. The framebuffer is unchanged.
    pub async fn invert_display(&mut self, invert: bool) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        session.inverted = invert;
        let opcode = if invert {
            command::INVERT_DISPLAY
        } else {
            command::NORMAL_DISPLAY
        };
        self.transport.command(&[opcode]).await
    }

    pub fn is_inverted(&self) -> Result<bool, OledError> {
        Ok(self.session()?.inverted)
    }

    // ── Scrolling ────────────────────────────────────────────────────

    /// Scroll pages `start_page..=end_page` to the right.
    pub async fn start_scroll_right(
        &mut self,
        start_page: u8,
        end_page: u8,
    ) -> Result<(), OledError> {
        self.start_scroll(ScrollMode::HorizontalRight, start_page, end_page).await
    }

    /// Scroll pages `start_page..=end_page` to the left.
    pub async fn start_scroll_left(
        &mut self,
        start_page: u8,
        end_page: u8,
    ) -> Result<(), OledError> {
        self.start_scroll(ScrollMode::HorizontalLeft, start_page, end_page).await
    }

    /// Scroll right and vertically over the whole panel height.
    pub async fn start_scroll_diag_right(
        &mut self,
        start_page: u8,
        end_page: u8,
    ) -> Result<(), OledError> {
        self.start_scroll(ScrollMode::DiagonalRight, start_page, end_page).await
    }

    /// Scroll left and vertically over the whole panel height.
    pub async fn start_scroll_diag_left(
        &mut self,
        start_page: u8,
        end_page: u8,
    ) -> Result<(), OledError> {
        self.start_scroll(ScrollMode::DiagonalLeft, start_page, end_page).await
    }

    /// Stop any hardware scroll. Always sends the stop command.
    pub async fn stop_scroll(&mut self) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        let bytes = session.scroll.stop();
        self.transport.command(&bytes).await
    }

    pub fn scroll_state(&self) -> Result<ScrollState, OledError> {
        Ok(self.session()?.scroll.state())
    }

    /// Step interval for scrolls started after this call.
    pub fn set_scroll_interval(&mut self, interval: ScrollInterval) -> Result<(), OledError> {
        self.session_mut()?.scroll.set_interval(interval);
        Ok(())
    }

    async fn start_scroll(
        &mut self,
        mode: ScrollMode,
        start_page: u8,
        end_page: u8,
    ) -> Result<(), OledError> {
        let session = self.session.as_mut().ok_or(OledError::NotInitialized)?;
        let size = session.framebuffer.display_size();
        let bytes = session.scroll.start(mode, start_page, end_page, size);

        #[cfg(feature = "defmt")]
        defmt::debug!("OLED scroll {} pages {}..={}", mode, start_page, end_page);

        self.transport.command(&bytes).await
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
