//! Timestamp values produced by the logical clocks.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Causal relation between two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CausalOrder {
    /// The left side happened before the right side
    Before,
    /// The left side happened after the right side
    After,
    /// Both sides are the same point in causal history
    Equal,
    /// Neither side happened before the other
    Concurrent,
}

impl CausalOrder {
    /// The relation seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            CausalOrder::Before => CausalOrder::After,
            CausalOrder::After => CausalOrder::Before,
            other => other,
        }
    }
}

/// Per-participant counters of a vector clock.
///
/// Participants missing from the map count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorTimestamp(BTreeMap<String, u64>);

impl VectorTimestamp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter of `participant`, 0 when absent.
    pub fn get(&self, participant: &str) -> u64 {
        self.0.get(participant).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(id, ticks)| (id.as_str(), *ticks))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest counter in the vector, 0 when empty.
    pub fn max_entry(&self) -> u64 {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Partial-order comparison.
    ///
    /// `Before` when every entry of `self` is ≤ the matching entry of `other`
    /// and at least one is strictly less; `After` symmetrically; `Equal` when
    /// all entries match; `Concurrent` otherwise.
    pub fn compare(&self, other: &VectorTimestamp) -> CausalOrder {
        let mut less = false;
        let mut greater = false;

        for participant in self.0.keys().chain(other.0.keys()) {
            let (left, right) = (self.get(participant), other.get(participant));
            if left < right {
                less = true;
            } else if left > right {
                greater = true;
            }
            if less && greater {
                return CausalOrder::Concurrent;
            }
        }

        match (less, greater) {
            (true, false) => CausalOrder::Before,
            (false, true) => CausalOrder::After,
            _ => CausalOrder::Equal,
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, u64> {
        &mut self.0
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for VectorTimestamp {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, ticks)| (id.into(), ticks)).collect())
    }
}

impl fmt::Display for VectorTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (participant, ticks)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{participant}: {ticks}")?;
        }
        write!(f, "}}")
    }
}

/// A point in logical time.
///
/// On the wire a scalar is a JSON number and a vector is a JSON object of
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Scalar(u64),
    Vector(VectorTimestamp),
}

impl Timestamp {
    /// Scalar view: the counter itself, or the largest vector entry.
    pub fn scalar_value(&self) -> u64 {
        match self {
            Timestamp::Scalar(ticks) => *ticks,
            Timestamp::Vector(vector) => vector.max_entry(),
        }
    }

    /// Causal comparison.
    ///
    /// Scalars are totally ordered. Mixed kinds compare by their scalar view.
    pub fn compare(&self, other: &Timestamp) -> CausalOrder {
        match (self, other) {
            (Timestamp::Vector(left), Timestamp::Vector(right)) => left.compare(right),
            _ => match self.scalar_value().cmp(&other.scalar_value()) {
                std::cmp::Ordering::Less => CausalOrder::Before,
                std::cmp::Ordering::Greater => CausalOrder::After,
                std::cmp::Ordering::Equal => CausalOrder::Equal,
            },
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Scalar(0)
    }
}

impl From<u64> for Timestamp {
    fn from(ticks: u64) -> Self {
        Timestamp::Scalar(ticks)
    }
}

impl From<VectorTimestamp> for Timestamp {
    fn from(vector: VectorTimestamp) -> Self {
        Timestamp::Vector(vector)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Scalar(ticks) => write!(f, "{ticks}"),
            Timestamp::Vector(vector) => write!(f, "{vector}"),
        }
    }
}
