//! SSD1306 command opcodes and the power-on initialisation sequence.
//!
//! Every opcode is sent in command mode (control byte `0x00`). Multi-byte
//! commands are an opcode followed by their argument bytes in the same
//! write.

use heapless::Vec;

use crate::config::{DisplaySize, VccMode};

// ── Fundamental commands ─────────────────────────────────────────────────

/// Set contrast; followed by one byte (0–255).
pub const SET_CONTRAST: u8 = 0x81;

/// Resume display from RAM content.
pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;

/// Normal display: RAM bit 1 lights the pixel.
pub const NORMAL_DISPLAY: u8 = 0xA6;

/// Inverse display: RAM bit 0 lights the pixel.
pub const INVERT_DISPLAY: u8 = 0xA7;

/// Panel off (sleep).
pub const DISPLAY_OFF: u8 = 0xAE;

/// Panel on.
pub const DISPLAY_ON: u8 = 0xAF;

// ── Addressing ───────────────────────────────────────────────────────────

/// Memory addressing mode; followed by `0x00` (horizontal).
pub const MEMORY_MODE: u8 = 0x20;

/// Column window; followed by start and end column.
pub const COLUMN_ADDR: u8 = 0x21;

/// Page window; followed by start and end page.
pub const PAGE_ADDR: u8 = 0x22;

/// Horizontal addressing mode argument for [`MEMORY_MODE`].
pub const HORIZONTAL_ADDRESSING: u8 = 0x00;

// ── Hardware configuration ───────────────────────────────────────────────

/// Display start line, OR'd with the line number (0–63).
pub const SET_START_LINE: u8 = 0x40;

/// Segment re-map, OR'd with `1` to map column 127 to SEG0.
pub const SEG_REMAP: u8 = 0xA0;

/// Multiplex ratio; followed by `height - 1`.
pub const SET_MULTIPLEX: u8 = 0xA8;

/// COM output scan from COM[N-1] to COM0.
pub const COM_SCAN_DEC: u8 = 0xC8;

/// Vertical display offset; followed by one byte.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;

/// COM pins hardware configuration; followed by one byte.
pub const SET_COM_PINS: u8 = 0xDA;

// ── Timing and driving scheme ────────────────────────────────────────────

/// Clock divide ratio / oscillator frequency; followed by one byte.
pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;

/// Pre-charge period; followed by one byte.
pub const SET_PRECHARGE: u8 = 0xD9;

/// VCOMH deselect level; followed by one byte.
pub const SET_VCOM_DETECT: u8 = 0xDB;

/// Charge pump setting; followed by `0x14` (enable) or `0x10` (disable).
pub const CHARGE_PUMP: u8 = 0x8D;

// ── Scrolling ────────────────────────────────────────────────────────────

/// Continuous horizontal scroll to the right.
pub const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;

/// Continuous horizontal scroll to the left.
pub const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;

/// Continuous vertical and right horizontal scroll.
pub const VERTICAL_AND_RIGHT_HORIZONTAL_SCROLL: u8 = 0x29;

/// Continuous vertical and left horizontal scroll.
pub const VERTICAL_AND_LEFT_HORIZONTAL_SCROLL: u8 = 0x2A;

/// Stop scrolling. Must precede any scroll reconfiguration.
pub const DEACTIVATE_SCROLL: u8 = 0x2E;

/// Start scrolling with the last configured parameters.
pub const ACTIVATE_SCROLL: u8 = 0x2F;

/// Vertical scroll area; followed by fixed rows and scrolled rows.
pub const SET_VERTICAL_SCROLL_AREA: u8 = 0xA3;

// ── Initialisation ───────────────────────────────────────────────────────

/// Upper bound on the number of bytes in [`init_sequence`].
pub const INIT_SEQUENCE_CAPACITY: usize = 32;

/// Build the controller power-on sequence for a panel.
///
/// The first byte is always [`DISPLAY_OFF`] so it can double as the
/// presence probe. The charge pump is configured before [`DISPLAY_ON`],
/// which is the last byte, and scrolling is deactivated before the panel
/// is switched on.
pub fn init_sequence(
    size: DisplaySize,
    vcc: VccMode,
    contrast: u8,
) -> Vec<u8, INIT_SEQUENCE_CAPACITY> {
    let bytes = [
        DISPLAY_OFF,
        SET_DISPLAY_CLOCK_DIV,
        0x80,
        SET_MULTIPLEX,
        (size.height() - 1) as u8,
        SET_DISPLAY_OFFSET,
        0x00,
        SET_START_LINE,
        CHARGE_PUMP,
        vcc.charge_pump(),
        MEMORY_MODE,
        HORIZONTAL_ADDRESSING,
        SEG_REMAP | 0x01,
        COM_SCAN_DEC,
        SET_COM_PINS,
        size.com_pins(),
        SET_CONTRAST,
        contrast,
        SET_PRECHARGE,
        vcc.precharge(),
        SET_VCOM_DETECT,
        0x40,
        DISPLAY_ALL_ON_RESUME,
        NORMAL_DISPLAY,
        DEACTIVATE_SCROLL,
        DISPLAY_ON,
    ];

    let mut sequence = Vec::new();
    // 26 bytes always fit in INIT_SEQUENCE_CAPACITY.
    let _ = sequence.extend_from_slice(&bytes);
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(seq: &[u8], byte: u8) -> usize {
        seq.iter().position(|&b| b == byte).unwrap()
    }

    #[test]
    fn sequence_starts_off_and_ends_on() {
        let seq = init_sequence(DisplaySize::Size128x64, VccMode::SwitchCap, 0xCF);
        assert_eq!(seq.first(), Some(&DISPLAY_OFF));
        assert_eq!(seq.last(), Some(&DISPLAY_ON));
    }

    #[test]
    fn charge_pump_precedes_display_on() {
        let seq = init_sequence(DisplaySize::Size128x64, VccMode::SwitchCap, 0xCF);
        let pump = position(&seq, CHARGE_PUMP);
        assert_eq!(seq[pump + 1], 0x14);
        assert!(pump < seq.len() - 1);
    }

    #[test]
    fn scroll_deactivated_before_display_on() {
        let seq = init_sequence(DisplaySize::Size128x32, VccMode::SwitchCap, 0xCF);
        assert_eq!(seq[seq.len() - 2], DEACTIVATE_SCROLL);
    }

    #[test]
    fn geometry_drives_multiplex_and_com_pins() {
        let seq = init_sequence(DisplaySize::Size128x32, VccMode::SwitchCap, 0xCF);
        assert_eq!(seq[position(&seq, SET_MULTIPLEX) + 1], 31);
        assert_eq!(seq[position(&seq, SET_COM_PINS) + 1], 0x02);

        let seq = init_sequence(DisplaySize::Size128x64, VccMode::SwitchCap, 0xCF);
        assert_eq!(seq[position(&seq, SET_MULTIPLEX) + 1], 63);
        assert_eq!(seq[position(&seq, SET_COM_PINS) + 1], 0x12);
    }

    #[test]
    fn external_vcc_disables_pump_and_shortens_precharge() {
        let seq = init_sequence(DisplaySize::Size96x16, VccMode::External, 0x9F);
        assert_eq!(seq[position(&seq, CHARGE_PUMP) + 1], 0x10);
        assert_eq!(seq[position(&seq, SET_PRECHARGE) + 1], 0x22);
        assert_eq!(seq[position(&seq, SET_CONTRAST) + 1], 0x9F);
    }
}
