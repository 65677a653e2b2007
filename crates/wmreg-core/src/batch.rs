//! Fail-fast multi-register writes
//!
//! `writeall` and macros both push a list of register writes in order and
//! stop at the first bus failure. Writes already applied stay applied.
//! Instead of unwinding, the run returns a [`BatchOutcome`] describing how
//! far it got so the caller can report it and keep the session going.

use crate::codec;
use crate::error::Error;
use crate::transport::I2cMaster;

/// The write that stopped a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFailure {
    /// Zero-based position of the failing write
    pub step: usize,
    /// Register the failing write targeted
    pub register: u8,
    /// Error reported for it
    pub error: Error,
}

/// How far a batch got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Writes that succeeded (always a prefix of the batch)
    pub completed: usize,
    /// Writes in the batch
    pub total: usize,
    /// First failure; `None` when every write was applied
    pub failure: Option<BatchFailure>,
}

impl BatchOutcome {
    /// Whether every write was applied
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Writes that were never attempted because of an earlier failure
    pub fn skipped(&self) -> usize {
        match self.failure {
            Some(_) => self.total - self.completed - 1,
            None => 0,
        }
    }
}

/// Write each `(register, value)` pair in order, stopping at the first error
///
/// `on_step` sees every attempted write with its result, including the
/// failing one, before the batch moves on or stops.
pub fn write_sequence<M, I, F>(bus: &mut M, device: u8, steps: I, mut on_step: F) -> BatchOutcome
where
    M: I2cMaster + ?Sized,
    I: IntoIterator<Item = (u8, u16)>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(usize, u8, u16, Result<(), Error>),
{
    let steps = steps.into_iter();
    let mut outcome = BatchOutcome {
        completed: 0,
        total: steps.len(),
        failure: None,
    };

    for (step, (register, value)) in steps.enumerate() {
        let result = codec::write_register(bus, device, register, value);
        on_step(step, register, value, result);

        if let Err(error) = result {
            log::debug!(
                "batch stopped at step {} of {}: {}",
                step + 1,
                outcome.total,
                error
            );
            outcome.failure = Some(BatchFailure {
                step,
                register: register & codec::REGISTER_MASK,
                error,
            });
            break;
        }
        outcome.completed += 1;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusFault;
    use crate::transport::BusResult;
    use alloc::vec::Vec;

    /// Accepts `ok` writes, then fails every following one
    struct FailAfter {
        ok: usize,
        seen: Vec<u8>,
    }

    impl I2cMaster for FailAfter {
        fn quick_check(&mut self, _address: u8) -> BusResult<()> {
            Ok(())
        }

        fn write(&mut self, _address: u8, bytes: &[u8]) -> BusResult<()> {
            self.seen.push(bytes[0] >> 1);
            if self.seen.len() > self.ok {
                return Err(BusFault::Nack);
            }
            Ok(())
        }

        fn write_read(&mut self, _address: u8, _bytes: &[u8], _buf: &mut [u8]) -> BusResult<()> {
            Err(BusFault::Unsupported)
        }
    }

    #[test]
    fn test_all_steps_applied() {
        let mut bus = FailAfter {
            ok: usize::MAX,
            seen: Vec::new(),
        };
        let outcome = write_sequence(&mut bus, 0x1A, [(1, 1), (2, 2), (3, 3)], |_, _, _, _| {});
        assert!(outcome.is_complete());
        assert_eq!(outcome.completed, 3);
        assert_eq!(outcome.skipped(), 0);
        assert_eq!(bus.seen, [1, 2, 3]);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let mut bus = FailAfter {
            ok: 1,
            seen: Vec::new(),
        };
        let mut reported = Vec::new();
        let outcome = write_sequence(&mut bus, 0x1A, [(1, 1), (2, 2), (3, 3)], |i, _, _, r| {
            reported.push((i, r.is_ok()))
        });

        assert_eq!(bus.seen, [1, 2]);
        assert_eq!(reported, [(0, true), (1, false)]);
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(
            outcome.failure,
            Some(BatchFailure {
                step: 1,
                register: 2,
                error: Error::Transport {
                    device: 0x1A,
                    register: 2,
                    fault: BusFault::Nack,
                },
            })
        );
    }

    #[test]
    fn test_empty_batch() {
        let mut bus = FailAfter {
            ok: 0,
            seen: Vec::new(),
        };
        let outcome = write_sequence(&mut bus, 0x1A, [], |_, _, _, _| {});
        assert_eq!(outcome.total, 0);
        assert!(outcome.is_complete());
        assert!(bus.seen.is_empty());
    }
}
