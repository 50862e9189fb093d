//! Scalar Lamport clock.

use std::sync::atomic::{AtomicU64, Ordering};

use super::{LogicalClock, Timestamp};

/// Lock-free Lamport clock.
///
/// Every update is a compare-and-swap on a single `AtomicU64`; no caller ever
/// waits on another. The counter saturates at `u64::MAX` instead of wrapping,
/// so a hostile remote value cannot make it go backwards.
#[derive(Debug, Default)]
pub struct LamportClock {
    ticks: AtomicU64,
}

impl LamportClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `ticks` instead of 0.
    pub fn starting_at(ticks: u64) -> Self {
        Self {
            ticks: AtomicU64::new(ticks),
        }
    }

    /// Increment by one and return the new value.
    pub fn tick(&self) -> u64 {
        match self
            .ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(1))
            }) {
            Ok(previous) | Err(previous) => previous.saturating_add(1),
        }
    }

    /// Current value (wait-free).
    pub fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Install `max(local, remote) + 1` and return it.
    ///
    /// Read, compute the candidate, try to install it; if another caller
    /// committed in between, retry against the value it left. Each committed
    /// value is strictly greater than the one it replaced.
    pub fn sync(&self, remote: u64) -> u64 {
        let mut current = self.ticks.load(Ordering::Acquire);
        loop {
            let synced = current.max(remote).saturating_add(1);
            match self.ticks.compare_exchange_weak(
                current,
                synced,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return synced,
                Err(actual) => current = actual,
            }
        }
    }
}

impl LogicalClock for LamportClock {
    fn tick(&self) -> Timestamp {
        Timestamp::Scalar(LamportClock::tick(self))
    }

    fn now(&self) -> Timestamp {
        Timestamp::Scalar(LamportClock::now(self))
    }

    fn sync(&self, remote: &Timestamp) -> Timestamp {
        Timestamp::Scalar(LamportClock::sync(self, remote.scalar_value()))
    }
}
