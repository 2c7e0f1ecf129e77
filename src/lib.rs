//! Async SSD1306 OLED driver and graphics library over I2C.
//!
//! This crate provides [`OledDriver`], a session-oriented driver for SSD1306
//! panels (128×64, 128×32 and 96×16) built on `embedded-hal-async`, with a
//! page-packed [`Framebuffer`], shape rasterization, a built-in 5x7 font
//! and hardware scroll control.
//!
//! # Quick Start
//!
//! ```ignore
//! use oled_display_rs::{Color, DisplayConfig, OledDriver};
//!
//! let mut oled = OledDriver::new(i2c, DisplayConfig::default());
//! oled.begin().await?;
//! oled.clear_display()?;
//! oled.draw_rect(0, 0, 128, 64, Color::On)?;
//! oled.set_cursor(4, 4)?;
//! oled.print("Hello")?;
//! oled.display().await?;
//! ```
//!
//! The framebuffer is also an `embedded-graphics` [`DrawTarget`], reachable
//! through [`OledDriver::canvas_mut`].
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via `defmt`.
//! - **`task`**: `refresh_task`, a periodic refresh loop for a driver
//!   shared through an `embassy-sync` mutex.
//!
//! [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod config;
#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod raster;
pub mod scroll;
pub mod text;
pub mod transport;

#[cfg(test)]
mod mock;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use config::{
    DisplayConfig, DisplaySize, RefreshConfig, VccMode, ALTERNATE_ADDRESS, DEFAULT_ADDRESS,
};
#[cfg(feature = "task")]
pub use display_task::refresh_task;
pub use driver::OledDriver;
pub use error::OledError;
pub use framebuffer::{Color, DirtyRegion, Framebuffer};
pub use raster::Canvas;
pub use scroll::{ScrollInterval, ScrollMode, ScrollState};
pub use text::TextCursor;
