//! Panel geometry, power configuration and driver settings.
//!
//! [`DisplayConfig`] is the single place where a caller describes the
//! attached panel. It is plain data: nothing is validated until
//! [`OledDriver::begin()`](crate::OledDriver::begin) runs.

use crate::error::OledError;

/// Default 7-bit I2C address of SSD1306 modules (SA0 low).
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Alternate 7-bit I2C address (SA0 high).
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// Default number of payload bytes per I2C data write.
pub const DEFAULT_MAX_CHUNK: usize = 128;

// ── DisplaySize ──────────────────────────────────────────────────────────

/// Panel geometries supported by the controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplaySize {
    /// 128×64 pixels, 8 pages.
    Size128x64,
    /// 128×32 pixels, 4 pages.
    Size128x32,
    /// 96×16 pixels, 2 pages.
    Size96x16,
}

impl DisplaySize {
    /// Match a width/height pair against the supported geometries.
    ///
    /// Returns `None` for any other combination.
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        match (width, height) {
            (128, 64) => Some(DisplaySize::Size128x64),
            (128, 32) => Some(DisplaySize::Size128x32),
            (96, 16) => Some(DisplaySize::Size96x16),
            _ => None,
        }
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        match self {
            DisplaySize::Size128x64 | DisplaySize::Size128x32 => 128,
            DisplaySize::Size96x16 => 96,
        }
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        match self {
            DisplaySize::Size128x64 => 64,
            DisplaySize::Size128x32 => 32,
            DisplaySize::Size96x16 => 16,
        }
    }

    /// Number of 8-row pages (`ceil(height / 8)`).
    pub fn pages(self) -> u32 {
        self.height().div_ceil(8)
    }

    /// Framebuffer length in bytes: `pages * width`.
    pub fn buffer_len(self) -> usize {
        (self.pages() * self.width()) as usize
    }

    /// Argument for the COM pins configuration command.
    ///
    /// 64-row panels use the alternative COM layout; shorter panels use
    /// sequential COM pins.
    pub fn com_pins(self) -> u8 {
        match self {
            DisplaySize::Size128x64 => 0x12,
            DisplaySize::Size128x32 | DisplaySize::Size96x16 => 0x02,
        }
    }
}

// ── VccMode ──────────────────────────────────────────────────────────────

/// How the panel's high-voltage supply is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VccMode {
    /// VCC supplied externally; the internal charge pump stays off.
    External,
    /// VCC generated by the internal charge pump from 3.3 V.
    #[default]
    SwitchCap,
}

impl VccMode {
    /// Argument for the charge pump command.
    pub fn charge_pump(self) -> u8 {
        match self {
            VccMode::External => 0x10,
            VccMode::SwitchCap => 0x14,
        }
    }

    /// Argument for the pre-charge period command.
    pub fn precharge(self) -> u8 {
        match self {
            VccMode::External => 0x22,
            VccMode::SwitchCap => 0xF1,
        }
    }

    /// Contrast used when [`DisplayConfig::contrast`] is `None`.
    pub fn default_contrast(self) -> u8 {
        match self {
            VccMode::External => 0x9F,
            VccMode::SwitchCap => 0xCF,
        }
    }
}

// ── DisplayConfig ────────────────────────────────────────────────────────

/// Configuration for one attached panel.
///
/// [`DisplayConfig::default()`] describes the common 128×64 module at
/// `0x3C` running from its internal charge pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// 7-bit I2C address. Default: `0x3C`.
    pub address: u8,
    /// Panel width in pixels. Default: 128.
    pub width: u32,
    /// Panel height in pixels. Default: 64.
    pub height: u32,
    /// Supply mode. Default: [`VccMode::SwitchCap`].
    pub vcc: VccMode,
    /// Initial contrast. `None` picks the VCC mode's default.
    pub contrast: Option<u8>,
    /// Maximum payload bytes per data write. Clamped to
    /// `1..=`[`MAX_CHUNK_LEN`](crate::transport::MAX_CHUNK_LEN). Default: 128.
    pub max_chunk: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            width: 128,
            height: 64,
            vcc: VccMode::SwitchCap,
            contrast: None,
            max_chunk: DEFAULT_MAX_CHUNK,
        }
    }
}

impl DisplayConfig {
    /// Configuration for a panel of the given size, other fields default.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Resolve the configured width/height to a supported geometry.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidGeometry`] for unsupported pairs.
    pub fn size(&self) -> Result<DisplaySize, OledError> {
        DisplaySize::from_dimensions(self.width, self.height).ok_or(OledError::InvalidGeometry)
    }

    /// Contrast to program at initialisation.
    pub fn initial_contrast(&self) -> u8 {
        self.contrast.unwrap_or(self.vcc.default_contrast())
    }
}

// ── RefreshConfig ────────────────────────────────────────────────────────

/// Settings for the periodic refresh task.
pub struct RefreshConfig {
    /// Refresh rate in Hz. Default: 30. A value of 0 is treated as 1.
    pub update_frequency_hz: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 30,
        }
    }
}

impl RefreshConfig {
    /// Convert the configured frequency to a timer period in milliseconds.
    ///
    /// Formula: `1000 / update_frequency_hz`.
    pub fn update_period_ms(&self) -> u64 {
        1000 / self.update_frequency_hz.max(1) as u64
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let c = DisplayConfig::default();
        assert_eq!(c.address, 0x3C);
        assert_eq!(c.width, 128);
        assert_eq!(c.height, 64);
        assert_eq!(c.vcc, VccMode::SwitchCap);
        assert_eq!(c.contrast, None);
        assert_eq!(c.max_chunk, 128);
        assert_eq!(c.initial_contrast(), 0xCF);
    }

    #[test]
    fn supported_geometries_resolve() {
        assert_eq!(
            DisplayConfig::with_dimensions(128, 64).size(),
            Ok(DisplaySize::Size128x64)
        );
        assert_eq!(
            DisplayConfig::with_dimensions(128, 32).size(),
            Ok(DisplaySize::Size128x32)
        );
        assert_eq!(
            DisplayConfig::with_dimensions(96, 16).size(),
            Ok(DisplaySize::Size96x16)
        );
    }

    #[test]
    fn unsupported_geometry_is_rejected() {
        assert_eq!(
            DisplayConfig::with_dimensions(64, 128).size(),
            Err(OledError::InvalidGeometry)
        );
        assert_eq!(
            DisplayConfig::with_dimensions(0, 0).size(),
            Err(OledError::InvalidGeometry)
        );
    }

    #[test]
    fn buffer_len_is_pages_times_width() {
        assert_eq!(DisplaySize::Size128x64.buffer_len(), 1024);
        assert_eq!(DisplaySize::Size128x32.buffer_len(), 512);
        assert_eq!(DisplaySize::Size96x16.buffer_len(), 192);
        assert_eq!(DisplaySize::Size128x64.pages(), 8);
    }

    #[test]
    fn explicit_contrast_overrides_vcc_default() {
        let c = DisplayConfig {
            vcc: VccMode::External,
            ..DisplayConfig::default()
        };
        assert_eq!(c.initial_contrast(), 0x9F);

        let c = DisplayConfig {
            contrast: Some(0x10),
            ..DisplayConfig::default()
        };
        assert_eq!(c.initial_contrast(), 0x10);
    }

    #[test]
    fn update_period_30hz() {
        let c = RefreshConfig::default();
        assert_eq!(c.update_period_ms(), 33);
    }

    #[test]
    fn update_period_zero_hz_does_not_divide_by_zero() {
        let c = RefreshConfig {
            update_frequency_hz: 0,
        };
        assert_eq!(c.update_period_ms(), 1000);
    }
}
