//! Hardware scroll state machine.
//!
//! The SSD1306 scrolls its RAM contents on its own once activated; the
//! framebuffer is never touched. The controller requires scrolling to be
//! deactivated before it is reconfigured, so [`ScrollController::start`]
//! prepends a stop command whenever a scroll is already running.
//!
//! The controller only produces command bytes. The driver sends them.

use heapless::Vec;

use crate::command;
use crate::config::DisplaySize;

/// Upper bound on the bytes produced by one [`ScrollController::start`].
pub const SCROLL_SEQUENCE_CAPACITY: usize = 16;

/// Rows the diagonal scroll moves per step.
const VERTICAL_OFFSET: u8 = 0x01;

// ── Types ────────────────────────────────────────────────────────────────

/// Direction of a scroll to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollMode {
    HorizontalRight,
    HorizontalLeft,
    DiagonalRight,
    DiagonalLeft,
}

impl ScrollMode {
    fn opcode(self) -> u8 {
        match self {
            ScrollMode::HorizontalRight => command::RIGHT_HORIZONTAL_SCROLL,
            ScrollMode::HorizontalLeft => command::LEFT_HORIZONTAL_SCROLL,
            ScrollMode::DiagonalRight => command::VERTICAL_AND_RIGHT_HORIZONTAL_SCROLL,
            ScrollMode::DiagonalLeft => command::VERTICAL_AND_LEFT_HORIZONTAL_SCROLL,
        }
    }

    fn is_diagonal(self) -> bool {
        matches!(self, ScrollMode::DiagonalRight | ScrollMode::DiagonalLeft)
    }
}

/// What the controller was last told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollState {
    #[default]
    Stopped,
    HorizontalRight,
    HorizontalLeft,
    DiagonalRight,
    DiagonalLeft,
}

impl From<ScrollMode> for ScrollState {
    fn from(mode: ScrollMode) -> Self {
        match mode {
            ScrollMode::HorizontalRight => ScrollState::HorizontalRight,
            ScrollMode::HorizontalLeft => ScrollState::HorizontalLeft,
            ScrollMode::DiagonalRight => ScrollState::DiagonalRight,
            ScrollMode::DiagonalLeft => ScrollState::DiagonalLeft,
        }
    }
}

/// Time between scroll steps, in frames.
///
/// Discriminants are the controller's 3-bit interval codes, which are not
/// in ascending order of duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScrollInterval {
    #[default]
    Frames5 = 0b000,
    Frames64 = 0b001,
    Frames128 = 0b010,
    Frames256 = 0b011,
    Frames3 = 0b100,
    Frames4 = 0b101,
    Frames25 = 0b110,
    Frames2 = 0b111,
}

// ── ScrollController ─────────────────────────────────────────────────────

/// Tracks the active scroll and builds command sequences for changes.
#[derive(Debug, Clone, Default)]
pub struct ScrollController {
    state: ScrollState,
    range: Option<(u8, u8)>,
    interval: ScrollInterval,
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Page range of the last started scroll, after clamping.
    pub fn range(&self) -> Option<(u8, u8)> {
        self.range
    }

    pub fn interval(&self) -> ScrollInterval {
        self.interval
    }

    /// Step interval used by scrolls started after this call.
    pub fn set_interval(&mut self, interval: ScrollInterval) {
        self.interval = interval;
    }

    /// Switch to `mode` over pages `start_page..=end_page`.
    ///
    /// Pages are clamped to the panel and put in ascending order. Returns
    /// the full command sequence: a stop if a scroll was active, the mode
    /// setup, then activation.
    pub fn start(
        &mut self,
        mode: ScrollMode,
        start_page: u8,
        end_page: u8,
        size: DisplaySize,
    ) -> Vec<u8, SCROLL_SEQUENCE_CAPACITY> {
        let last_page = (size.pages() - 1) as u8;
        let (mut first, mut last) = (start_page.min(last_page), end_page.min(last_page));
        if first > last {
            core::mem::swap(&mut first, &mut last);
        }

        let mut bytes: Vec<u8, SCROLL_SEQUENCE_CAPACITY> = Vec::new();
        if self.state != ScrollState::Stopped {
            let _ = bytes.push(command::DEACTIVATE_SCROLL);
        }

        let interval = self.interval as u8;
        // Longest path is 11 bytes, well inside the capacity.
        let _ = if mode.is_diagonal() {
            bytes.extend_from_slice(&[
                command::SET_VERTICAL_SCROLL_AREA,
                0x00,
                size.height() as u8,
                mode.opcode(),
                0x00,
                first,
                interval,
                last,
                VERTICAL_OFFSET,
            ])
        } else {
            bytes.extend_from_slice(&[mode.opcode(), 0x00, first, interval, last, 0x00, 0xFF])
        };
        let _ = bytes.push(command::ACTIVATE_SCROLL);

        self.state = mode.into();
        self.range = Some((first, last));
        bytes
    }

    /// Stop scrolling. Always emits the stop command.
    pub fn stop(&mut self) -> [u8; 1] {
        self.state = ScrollState::Stopped;
        [command::DEACTIVATE_SCROLL]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: DisplaySize = DisplaySize::Size128x64;

    #[test]
    fn horizontal_right_from_stopped() {
        let mut scroll = ScrollController::new();
        let bytes = scroll.start(ScrollMode::HorizontalRight, 0, 7, SIZE);

        assert_eq!(bytes.as_slice(), [0x26, 0x00, 0, 0x00, 7, 0x00, 0xFF, 0x2F]);
        assert_eq!(scroll.state(), ScrollState::HorizontalRight);
        assert_eq!(scroll.range(), Some((0, 7)));
    }

    #[test]
    fn horizontal_left_from_stopped() {
        let mut scroll = ScrollController::new();
        let bytes = scroll.start(ScrollMode::HorizontalLeft, 1, 5, SIZE);

        assert_eq!(bytes.as_slice(), [0x27, 0x00, 1, 0x00, 5, 0x00, 0xFF, 0x2F]);
        assert_eq!(scroll.state(), ScrollState::HorizontalLeft);
        assert_eq!(scroll.range(), Some((1, 5)));
    }

    #[test]
    fn diagonal_right_from_stopped() {
        let mut scroll = ScrollController::new();
        let bytes = scroll.start(ScrollMode::DiagonalRight, 0, 7, SIZE);

        assert_eq!(
            bytes.as_slice(),
            [0xA3, 0x00, 64, 0x29, 0x00, 0, 0x00, 7, 0x01, 0x2F]
        );
        assert_eq!(scroll.state(), ScrollState::DiagonalRight);
    }

    #[test]
    fn restart_while_active_stops_first() {
        let mut scroll = ScrollController::new();
        scroll.start(ScrollMode::HorizontalRight, 0, 7, SIZE);
        let bytes = scroll.start(ScrollMode::HorizontalLeft, 0, 7, SIZE);

        assert_eq!(bytes[0], 0x2E);
        assert_eq!(bytes[1], 0x27);
        assert_eq!(bytes.last(), Some(&0x2F));
        assert_eq!(scroll.state(), ScrollState::HorizontalLeft);
    }

    #[test]
    fn diagonal_sets_vertical_area_first() {
        let mut scroll = ScrollController::new();
        let bytes = scroll.start(ScrollMode::DiagonalLeft, 1, 2, DisplaySize::Size128x32);

        assert_eq!(
            bytes.as_slice(),
            [0xA3, 0x00, 32, 0x2A, 0x00, 1, 0x00, 2, 0x01, 0x2F]
        );
        assert_eq!(scroll.state(), ScrollState::DiagonalLeft);
    }

    #[test]
    fn pages_are_clamped_and_ordered() {
        let mut scroll = ScrollController::new();
        scroll.start(ScrollMode::HorizontalLeft, 200, 1, DisplaySize::Size128x32);
        assert_eq!(scroll.range(), Some((1, 3)));

        scroll.start(ScrollMode::HorizontalLeft, 5, 2, SIZE);
        assert_eq!(scroll.range(), Some((2, 5)));
    }

    #[test]
    fn interval_code_is_used() {
        let mut scroll = ScrollController::new();
        scroll.set_interval(ScrollInterval::Frames2);
        let bytes = scroll.start(ScrollMode::HorizontalRight, 0, 3, SIZE);
        assert_eq!(bytes[3], 0b111);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut scroll = ScrollController::new();
        assert_eq!(scroll.stop(), [0x2E]);
        scroll.start(ScrollMode::DiagonalRight, 0, 7, SIZE);
        assert_eq!(scroll.stop(), [0x2E]);
        assert_eq!(scroll.stop(), [0x2E]);
        assert_eq!(scroll.state(), ScrollState::Stopped);

        // After a stop, the next start needs no leading deactivate.
        let bytes = scroll.start(ScrollMode::HorizontalRight, 0, 7, SIZE);
        assert_eq!(bytes[0], 0x26);
    }
}
