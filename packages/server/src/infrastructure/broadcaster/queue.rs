//! 有界キューを使った EventBroadcaster 実装
//!
//! ## 責務
//!
//! - レジストリのスナップショットを取り、各セッションのキューへ `try_send` する
//! - キューが満杯のセッションを退去対象としてリーパーへ通知する
//!
//! ## 設計ノート
//!
//! 配信はロックの外で行い、満杯のセッションをその場で削除しない。
//! 削除と `Left` の配信はリーパー（`DisconnectSessionUseCase::spawn_reaper`）
//! が非同期に行う。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{
    DeliveryError, EventBroadcaster, PublishReport, ServerEvent, SessionRegistry, SessionToken,
};

/// Receiving side of the eviction channel, drained by the reaper
pub type EvictionReceiver = mpsc::UnboundedReceiver<SessionToken>;

/// 各セッションの有界キューへ配信する EventBroadcaster 実装
pub struct QueueBroadcaster {
    registry: Arc<dyn SessionRegistry>,
    evictions: mpsc::UnboundedSender<SessionToken>,
}

impl QueueBroadcaster {
    /// 新しい QueueBroadcaster と退去通知の受信側を作成
    pub fn new(registry: Arc<dyn SessionRegistry>) -> (Self, EvictionReceiver) {
        let (evictions, eviction_rx) = mpsc::unbounded_channel();
        (
            Self {
                registry,
                evictions,
            },
            eviction_rx,
        )
    }
}

#[async_trait]
impl EventBroadcaster for QueueBroadcaster {
    async fn publish(&self, event: ServerEvent) -> PublishReport {
        let sessions = self.registry.snapshot().await;
        let mut report = PublishReport::default();

        for session in sessions {
            match session.try_deliver(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::QueueFull) => {
                    report.dropped += 1;
                    tracing::warn!(
                        username = %session.username(),
                        "outbound queue full, dropping event and evicting session"
                    );
                    if self.evictions.send(session.token().clone()).is_err() {
                        tracing::debug!("eviction reaper is gone, skipping eviction");
                    }
                }
                Err(DeliveryError::Closed) => {
                    report.closed += 1;
                    tracing::debug!(
                        username = %session.username(),
                        "outbound queue closed, skipping"
                    );
                }
            }
        }

        tracing::debug!(
            timestamp = %event.timestamp,
            delivered = report.delivered,
            dropped = report.dropped,
            closed = report.closed,
            "event published"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use chitchat_shared::{clock::LamportClock, time::FixedWallClock};

    use super::*;
    use crate::{
        domain::{MessageText, MockSessionRegistry, OutboundQueue, Username},
        infrastructure::InMemorySessionRegistry,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - N セッションへそれぞれ 1 回ずつ、publish 順で配信されること
    // - 満杯のキューがブロックせず、退去通知が送られること
    // - 受信側が閉じたキューはスキップされること
    // ========================================

    fn create_registry(queue_capacity: usize) -> Arc<InMemorySessionRegistry> {
        Arc::new(InMemorySessionRegistry::new(
            Arc::new(LamportClock::new()),
            Arc::new(FixedWallClock::new(0)),
            queue_capacity,
        ))
    }

    async fn join(registry: &InMemorySessionRegistry, name: &str) -> (SessionToken, OutboundQueue) {
        let registration = registry
            .register(Username::new(name).unwrap(), None)
            .await
            .unwrap();
        let session = registry.authenticate(&registration.token).await.unwrap();
        (registration.token, session.queue)
    }

    fn message(text: &str, ts: u64) -> ServerEvent {
        ServerEvent::message(
            Username::new("alice").unwrap(),
            MessageText::new(text, 128).unwrap(),
            ts.into(),
        )
    }

    #[tokio::test]
    async fn test_publish_delivers_one_copy_to_each_session_in_order() {
        // テスト項目: N 個のセッションそれぞれに 1 つずつ、publish 順で配信される
        // given (前提条件):
        let registry = create_registry(32);
        let (broadcaster, _evictions) = QueueBroadcaster::new(registry.clone());
        let mut queues = Vec::new();
        for name in ["alice", "bob", "carol"] {
            queues.push(join(&registry, name).await.1);
        }

        // when (操作):
        let first = broadcaster.publish(message("one", 10)).await;
        let second = broadcaster.publish(message("two", 11)).await;

        // then (期待する結果):
        assert_eq!(first.delivered, 3);
        assert_eq!(second.delivered, 3);
        for queue in &mut queues {
            assert_eq!(queue.recv().await, Some(message("one", 10)));
            assert_eq!(queue.recv().await, Some(message("two", 11)));
            assert!(queue.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_full_queue_is_dropped_and_evicted_without_blocking() {
        // テスト項目: 満杯のキューへの配信はブロックせずに破棄され、退去通知が送られる
        // given (前提条件):
        let registry = create_registry(2);
        let (broadcaster, mut evictions) = QueueBroadcaster::new(registry.clone());
        let (slow_token, _slow_queue) = join(&registry, "slow").await;
        let (_, mut fast_queue) = join(&registry, "fast").await;

        // when (操作):
        let mut reports = Vec::new();
        for ts in 1..=3 {
            reports.push(broadcaster.publish(message("x", ts)).await);
            fast_queue.recv().await;
        }

        // then (期待する結果):
        assert_eq!(reports[2].delivered, 1);
        assert_eq!(reports[2].dropped, 1);
        assert_eq!(evictions.recv().await, Some(slow_token));
    }

    #[tokio::test]
    async fn test_closed_queue_is_skipped() {
        // テスト項目: 受信側が閉じたキューはスキップされ、退去通知は送られない
        // given (前提条件):
        let registry = create_registry(32);
        let (broadcaster, mut evictions) = QueueBroadcaster::new(registry.clone());
        let (_, queue) = join(&registry, "gone").await;
        drop(queue);

        // when (操作):
        let report = broadcaster.publish(message("x", 1)).await;

        // then (期待する結果):
        assert_eq!(report.closed, 1);
        assert_eq!(report.recipients(), 1);
        assert!(evictions.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_with_no_sessions() {
        // テスト項目: セッションが存在しなくてもエラーにならない
        // given (前提条件):
        let mut registry = MockSessionRegistry::new();
        registry.expect_snapshot().times(1).returning(Vec::new);
        let (broadcaster, _evictions) = QueueBroadcaster::new(Arc::new(registry));

        // when (操作):
        let report = broadcaster.publish(message("x", 1)).await;

        // then (期待する結果):
        assert_eq!(report, PublishReport::default());
    }
}
