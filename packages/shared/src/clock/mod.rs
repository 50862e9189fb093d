//! Logical clocks.
//!
//! A process owns exactly one clock, created at startup and shared by every
//! connection. Two interchangeable variants implement [`LogicalClock`]:
//!
//! - [`LamportClock`]: a scalar counter merged with `max(local, remote) + 1`,
//!   giving a total order consistent with causality.
//! - [`VectorClock`]: one counter per participant, giving a partial order that
//!   can tell genuinely concurrent events apart (see [`CausalOrder`]).
//!
//! Both are internally synchronized; callers never lock around them.

mod lamport;
mod timestamp;
mod vector;

use std::sync::Arc;

pub use lamport::LamportClock;
pub use timestamp::{CausalOrder, Timestamp, VectorTimestamp};
pub use vector::VectorClock;

/// Common interface of the clock variants, used as `Arc<dyn LogicalClock>`.
pub trait LogicalClock: Send + Sync {
    /// Advance the clock for a local event and return the new value.
    fn tick(&self) -> Timestamp;

    /// Current value. Never a live view into the clock.
    fn now(&self) -> Timestamp;

    /// Merge a received timestamp, tick, and return the installed value.
    fn sync(&self, remote: &Timestamp) -> Timestamp;
}

/// Selects the clock variant at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClockKind {
    /// Scalar Lamport clock
    #[default]
    Lamport,
    /// Per-participant vector clock
    Vector,
}

impl ClockKind {
    /// Build a fresh clock of this kind.
    ///
    /// `node_id` is the participant id of the owner; only the vector clock
    /// uses it.
    pub fn build(self, node_id: &str) -> Arc<dyn LogicalClock> {
        match self {
            ClockKind::Lamport => Arc::new(LamportClock::new()),
            ClockKind::Vector => Arc::new(VectorClock::new(node_id)),
        }
    }
}
