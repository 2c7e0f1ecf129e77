//! Recording I2C bus used by the unit tests.

use std::vec::Vec;

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::transport::{CONTROL_COMMAND, CONTROL_DATA};

/// Fake I2C peripheral that records every write and can fail on demand.
#[derive(Default)]
pub(crate) struct FakeBus {
    /// `(address, bytes)` for every successful write, in order.
    pub writes: Vec<(u8, Vec<u8>)>,
    attempts: usize,
    fail_at: Option<(usize, ErrorKind)>,
}

impl FakeBus {
    pub const ADDRESS_NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);

    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the write attempt with zero-based index `index` (counted from
    /// now) with `kind`. Later writes succeed again.
    pub fn fail_on_write(&mut self, index: usize, kind: ErrorKind) {
        self.fail_at = Some((self.attempts + index, kind));
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.writes.clear();
    }

    /// Concatenated payloads of all command-mode writes.
    pub fn command_bytes(&self) -> Vec<u8> {
        self.payloads(CONTROL_COMMAND)
    }

    /// Concatenated payloads of all data-mode writes.
    pub fn data_bytes(&self) -> Vec<u8> {
        self.payloads(CONTROL_DATA)
    }

    /// Number of data-mode writes.
    pub fn data_writes(&self) -> usize {
        self.writes
            .iter()
            .filter(|(_, frame)| frame.first() == Some(&CONTROL_DATA))
            .count()
    }

    fn payloads(&self, control: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(_, frame)| frame.first() == Some(&control))
            .flat_map(|(_, frame)| frame[1..].iter().copied())
            .collect()
    }
}

impl ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl I2c for FakeBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let attempt = self.attempts;
                    self.attempts += 1;
                    if let Some((at, kind)) = self.fail_at {
                        if at == attempt {
                            self.fail_at = None;
                            return Err(kind);
                        }
                    }
                    self.writes.push((address, bytes.to_vec()));
                }
                Operation::Read(buffer) => buffer.fill(0),
            }
        }
        Ok(())
    }
}
