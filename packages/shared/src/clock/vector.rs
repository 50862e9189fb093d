//! Vector clock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{CausalOrder, LogicalClock, Timestamp, VectorTimestamp};

/// Vector clock owned by participant `id`.
///
/// The live map sits behind a mutex that is held only for the few
/// instructions of a merge or tick; readers always get a copy.
#[derive(Debug)]
pub struct VectorClock {
    id: String,
    entries: Mutex<VectorTimestamp>,
}

impl VectorClock {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let entries = VectorTimestamp::from_iter([(id.clone(), 0)]);
        Self {
            id,
            entries: Mutex::new(entries),
        }
    }

    /// Participant id whose entry [`tick`](Self::tick) advances.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Increment the own entry and return a copy of the result.
    pub fn tick(&self) -> VectorTimestamp {
        let mut entries = self.lock();
        Self::advance_own(&mut entries, &self.id);
        entries.clone()
    }

    /// Copy of the current vector.
    pub fn now(&self) -> VectorTimestamp {
        self.lock().clone()
    }

    /// Raise every local entry to at least the remote one, then tick.
    ///
    /// `remote` is an immutable snapshot, so only this clock is locked, and
    /// only for the merge itself.
    pub fn sync(&self, remote: &VectorTimestamp) -> VectorTimestamp {
        let mut entries = self.lock();
        for (participant, ticks) in remote.iter() {
            let local = entries.entries_mut().entry(participant.to_string()).or_insert(0);
            if *local < ticks {
                *local = ticks;
            }
        }
        Self::advance_own(&mut entries, &self.id);
        entries.clone()
    }

    /// Compare the current value against `other`.
    pub fn compare(&self, other: &VectorTimestamp) -> CausalOrder {
        self.now().compare(other)
    }

    fn advance_own(entries: &mut VectorTimestamp, id: &str) {
        let own = entries.entries_mut().entry(id.to_string()).or_insert(0);
        *own = own.saturating_add(1);
    }

    // The map stays consistent even if a holder panicked: every mutation is a
    // single monotone write.
    fn lock(&self) -> MutexGuard<'_, VectorTimestamp> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogicalClock for VectorClock {
    fn tick(&self) -> Timestamp {
        Timestamp::Vector(VectorClock::tick(self))
    }

    fn now(&self) -> Timestamp {
        Timestamp::Vector(VectorClock::now(self))
    }

    /// A scalar remote names no participant, so it merges as an empty vector.
    fn sync(&self, remote: &Timestamp) -> Timestamp {
        match remote {
            Timestamp::Vector(vector) => Timestamp::Vector(VectorClock::sync(self, vector)),
            Timestamp::Scalar(_) => Timestamp::Vector(VectorClock::tick(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn vector(entries: &[(&str, u64)]) -> VectorTimestamp {
        entries.iter().map(|(id, ticks)| (*id, *ticks)).collect()
    }

    #[test]
    fn test_new_clock_starts_with_own_entry_at_zero() {
        // テスト項目: 生成直後は自分のエントリが 0 で存在する
        // given (前提条件):
        let clock = VectorClock::new("server");

        // when (操作):
        let now = clock.now();

        // then (期待する結果):
        assert_eq!(now, vector(&[("server", 0)]));
        assert_eq!(clock.id(), "server");
    }

    #[test]
    fn test_tick_increments_only_own_entry() {
        // テスト項目: tick は自分のエントリだけを進める
        // given (前提条件):
        let clock = VectorClock::new("server");
        clock.sync(&vector(&[("alice", 4)]));

        // when (操作):
        let ticked = clock.tick();

        // then (期待する結果):
        assert_eq!(ticked, vector(&[("alice", 4), ("server", 2)]));
    }

    #[test]
    fn test_sync_never_lowers_entries() {
        // テスト項目: sync はエントリを下げず、最大値に引き上げてから tick する
        // given (前提条件):
        let clock = VectorClock::new("server");
        clock.sync(&vector(&[("alice", 5), ("bob", 1)]));

        // when (操作):
        let synced = clock.sync(&vector(&[("alice", 2), ("bob", 3), ("carol", 1)]));

        // then (期待する結果):
        assert_eq!(
            synced,
            vector(&[("alice", 5), ("bob", 3), ("carol", 1), ("server", 2)])
        );
    }

    #[test]
    fn test_sync_twice_with_same_snapshot_adds_one_tick_per_call() {
        // テスト項目: 同じスナップショットで 2 回 sync しても自分のエントリが 1 ずつ進むだけ
        // given (前提条件):
        let clock = VectorClock::new("server");
        let remote = vector(&[("alice", 3)]);

        // when (操作):
        let first = clock.sync(&remote);
        let second = clock.sync(&remote);

        // then (期待する結果):
        assert_eq!(first, vector(&[("alice", 3), ("server", 1)]));
        assert_eq!(second, vector(&[("alice", 3), ("server", 2)]));
        assert_eq!(first.compare(&second), CausalOrder::Before);
    }

    #[test]
    fn test_now_returns_a_copy() {
        // テスト項目: now が返す値を変更しても時計の内部状態は変わらない
        // given (前提条件):
        let clock = VectorClock::new("server");
        let mut snapshot = clock.now();

        // when (操作):
        snapshot.entries_mut().insert("server".to_string(), 100);

        // then (期待する結果):
        assert_eq!(clock.now(), vector(&[("server", 0)]));
    }

    #[test]
    fn test_compare_against_current_value() {
        // テスト項目: 現在値と他のタイムスタンプを比較できる
        // given (前提条件):
        let clock = VectorClock::new("server");
        clock.tick();

        // when (操作) / then (期待する結果):
        assert_eq!(clock.compare(&vector(&[("server", 2)])), CausalOrder::Before);
        assert_eq!(clock.compare(&vector(&[("server", 1)])), CausalOrder::Equal);
        assert_eq!(clock.compare(&vector(&[("alice", 1)])), CausalOrder::Concurrent);
    }

    #[test]
    fn test_scalar_remote_only_ticks() {
        // テスト項目: スカラーのタイムスタンプとの sync は自分のエントリを進めるだけ
        // given (前提条件):
        let clock = VectorClock::new("server");

        // when (操作):
        let synced = LogicalClock::sync(&clock, &Timestamp::Scalar(42));

        // then (期待する結果):
        assert_eq!(synced, Timestamp::Vector(vector(&[("server", 1)])));
    }

    #[test]
    fn test_concurrent_syncs_lose_no_updates() {
        // テスト項目: 並行した sync / tick で更新が失われない
        // given (前提条件):
        let clock = Arc::new(VectorClock::new("server"));
        let participants = ["alice", "bob", "carol", "dave"];
        let iterations = 500u64;

        // when (操作):
        thread::scope(|scope| {
            for participant in participants {
                let clock = Arc::clone(&clock);
                scope.spawn(move || {
                    for i in 1..=iterations {
                        clock.sync(&VectorTimestamp::from_iter([(participant, i)]));
                    }
                });
            }
        });

        // then (期待する結果):
        let now = clock.now();
        for participant in participants {
            assert_eq!(now.get(participant), iterations);
        }
        assert_eq!(now.get("server"), iterations * participants.len() as u64);
    }
}
