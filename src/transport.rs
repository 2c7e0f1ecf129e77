//! I2C framing for SSD1306 command and data transfers.
//!
//! Every write to the controller starts with a control byte:
//! `0x00` for a command stream, `0x40` for display RAM data. Payloads
//! longer than the configured chunk size are split into successive
//! writes, each carrying its own control byte, in original byte order.

use embedded_hal_async::i2c::{Error as _, I2c};
use heapless::Vec;

use crate::command;
use crate::error::OledError;

/// Control byte announcing a command stream.
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing display RAM data.
pub const CONTROL_DATA: u8 = 0x40;

/// Largest payload carried by a single write.
pub const MAX_CHUNK_LEN: usize = 255;

/// Control byte plus the largest payload.
const FRAME_CAPACITY: usize = MAX_CHUNK_LEN + 1;

/// Framed I2C link to one SSD1306 controller.
///
/// Owns the I2C peripheral for exclusive access. Every method awaits the
/// bus transfer to completion before returning; nothing is queued.
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
    max_chunk: usize,
}

impl<I2C> I2cTransport<I2C>
where
    I2C: I2c,
{
    /// Wrap an I2C peripheral.
    ///
    /// No I2C traffic is generated.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access)
    /// * `address`: 7-bit I2C device address (typically 0x3C)
    /// * `max_chunk`: payload bytes per write, clamped to `1..=MAX_CHUNK_LEN`
    pub fn new(i2c: I2C, address: u8, max_chunk: usize) -> Self {
        Self {
            i2c,
            address,
            max_chunk: max_chunk.clamp(1, MAX_CHUNK_LEN),
        }
    }

    /// 7-bit device address this transport writes to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Effective payload size per write after clamping.
    pub fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    // ── Framed writes ────────────────────────────────────────────────

    /// Check that a controller answers at the configured address.
    ///
    /// Sends [`command::DISPLAY_OFF`], which is harmless at any point and
    /// is the first byte of the initialisation sequence anyway.
    ///
    /// # Errors
    /// * [`OledError::DeviceNotFound`] if the address is not acknowledged
    /// * [`OledError::BusUnavailable`] on any other bus fault
    pub async fn probe(&mut self) -> Result<(), OledError> {
        self.write_framed(CONTROL_COMMAND, &[command::DISPLAY_OFF])
            .await
            .map_err(|e| OledError::from_probe(e.kind()))
    }

    /// Send an opcode and its arguments in command mode.
    ///
    /// Several complete commands may be concatenated in `bytes`; the
    /// controller parses them in order.
    ///
    /// # Errors
    /// Returns [`OledError::TransferFailure`] on a bus error.
    pub async fn command(&mut self, bytes: &[u8]) -> Result<(), OledError> {
        self.write_framed(CONTROL_COMMAND, bytes)
            .await
            .map_err(|e| OledError::TransferFailure(e.kind()))
    }

    /// Send display RAM data.
    ///
    /// Empty input produces no bus traffic.
    ///
    /// # Errors
    /// Returns [`OledError::TransferFailure`] on a bus error. Chunks sent
    /// before the failure have already reached the controller.
    pub async fn data(&mut self, bytes: &[u8]) -> Result<(), OledError> {
        self.write_framed(CONTROL_DATA, bytes)
            .await
            .map_err(|e| OledError::TransferFailure(e.kind()))
    }

    /// Write `bytes` as one or more `[control, chunk...]` frames.
    async fn write_framed(&mut self, control: u8, bytes: &[u8]) -> Result<(), I2C::Error> {
        for chunk in bytes.chunks(self.max_chunk) {
            let mut frame: Vec<u8, FRAME_CAPACITY> = Vec::new();
            // max_chunk <= MAX_CHUNK_LEN, so the frame always fits.
            let _ = frame.push(control);
            let _ = frame.extend_from_slice(chunk);

            self.i2c.write(self.address, &frame).await?;
        }

        Ok(())
    }

    // ── Ownership ────────────────────────────────────────────────────

    /// Give the I2C peripheral back to the caller.
    pub fn release(self) -> I2C {
        self.i2c
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &I2C {
        &self.i2c
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeBus;
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::ErrorKind;

    #[test]
    fn command_is_prefixed_with_control_byte() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 16);
        block_on(t.command(&[0x81, 0x7F])).unwrap();

        let bus = t.bus();
        assert_eq!(bus.writes.len(), 1);
        assert_eq!(bus.writes[0].0, 0x3C);
        assert_eq!(bus.writes[0].1, [0x00, 0x81, 0x7F]);
    }

    #[test]
    fn data_is_chunked_and_each_chunk_framed() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3D, 4);
        let payload: std::vec::Vec<u8> = (0..10).collect();
        block_on(t.data(&payload)).unwrap();

        let frames: std::vec::Vec<_> = t.bus().writes.iter().map(|(_, f)| f.clone()).collect();
        assert_eq!(
            frames,
            [
                std::vec![0x40, 0, 1, 2, 3],
                std::vec![0x40, 4, 5, 6, 7],
                std::vec![0x40, 8, 9],
            ]
        );
        assert!(t.bus().writes.iter().all(|(addr, _)| *addr == 0x3D));
    }

    #[test]
    fn empty_data_sends_nothing() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 16);
        block_on(t.data(&[])).unwrap();
        assert!(t.bus().writes.is_empty());
    }

    #[test]
    fn chunk_size_is_clamped() {
        let t = I2cTransport::new(FakeBus::new(), 0x3C, 0);
        assert_eq!(t.max_chunk(), 1);
        let t = I2cTransport::new(FakeBus::new(), 0x3C, 10_000);
        assert_eq!(t.max_chunk(), MAX_CHUNK_LEN);
    }

    #[test]
    fn mid_stream_failure_aborts_remaining_chunks() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 2);
        t.bus_mut().fail_on_write(1, ErrorKind::Bus);

        let result = block_on(t.data(&[1, 2, 3, 4, 5, 6]));
        assert_eq!(result, Err(OledError::TransferFailure(ErrorKind::Bus)));
        // Only the first chunk made it onto the bus.
        assert_eq!(t.bus().writes.len(), 1);
    }

    #[test]
    fn probe_classifies_missing_device() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 16);
        t.bus_mut().fail_on_write(0, FakeBus::ADDRESS_NACK);
        assert_eq!(block_on(t.probe()), Err(OledError::DeviceNotFound));
    }

    #[test]
    fn release_returns_the_bus() {
        let mut t = I2cTransport::new(FakeBus::new(), 0x3C, 16);
        block_on(t.command(&[0xAF])).unwrap();
        let bus = t.release();
        assert_eq!(bus.writes.len(), 1);
    }
}
