//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - DisconnectSessionUseCase::spawn_reaper() による退去処理
//! - DisconnectSessionUseCase::disconnect_all() によるサーバー停止時の切断
//! - DisconnectSessionUseCase::spawn_pending_expiry() によるストリーム未開始セッションの削除
//!
//! ### なぜこのテストが必要か
//! - 切断経路（クライアントの切断、I/O エラー、退去）が競合しても
//!   Left が 1 回だけ配信されることを保証
//! - 退去されたセッションの接続に close シグナルが届くことを保証
//! - ハンドシェイク後にストリームを開かなかったセッションがユーザー名を
//!   占有し続けないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：クライアントの切断
//! - 競合：同じセッションへの 2 回目の切断
//! - 退去：キューが満杯になったセッション
//! - 期限切れ：ストリームを開かないまま期限を過ぎたセッション

use std::{sync::Arc, time::Duration};

use chitchat_shared::clock::LogicalClock;
use tokio::task::JoinHandle;

use crate::{
    domain::{
        DisconnectReason, EventBroadcaster, ServerEvent, SessionHandle, SessionRegistry,
        SessionToken,
    },
    infrastructure::EvictionReceiver,
};

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn SessionRegistry>,
    broadcaster: Arc<dyn EventBroadcaster>,
    clock: Arc<dyn LogicalClock>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        broadcaster: Arc<dyn EventBroadcaster>,
        clock: Arc<dyn LogicalClock>,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            clock,
        }
    }

    /// 切断を実行
    ///
    /// セッションを削除できた呼び出しだけが、接続に close シグナルを送り、
    /// 新しく tick したタイムスタンプで Left を配信する。
    ///
    /// # Returns
    ///
    /// * `Some(ServerEvent)` - 配信した Left イベント
    /// * `None` - 既に削除済み
    pub async fn execute(
        &self,
        token: &SessionToken,
        reason: DisconnectReason,
    ) -> Option<ServerEvent> {
        let handle = self.registry.remove(token).await?;
        Some(self.announce_left(handle, reason).await)
    }

    /// ストリームが開かれていないセッションを削除する
    ///
    /// 既にストリームが開かれている、または削除済みの場合は何もしない。
    pub async fn expire_pending(&self, token: &SessionToken) -> Option<ServerEvent> {
        let handle = self.registry.remove_pending(token).await?;
        Some(
            self.announce_left(handle, DisconnectReason::StreamNotOpened)
                .await,
        )
    }

    /// `timeout` 経過後にストリームが開かれていなければセッションを削除する
    /// タスクを起動
    pub fn spawn_pending_expiry(
        self: Arc<Self>,
        token: SessionToken,
        timeout: Duration,
    ) -> JoinHandle<Option<ServerEvent>> {
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            self.expire_pending(&token).await
        })
    }

    async fn announce_left(&self, handle: SessionHandle, reason: DisconnectReason) -> ServerEvent {
        handle.close();

        let left = ServerEvent::left(handle.username().clone(), self.clock.tick());
        tracing::info!(
            username = %handle.username(),
            timestamp = %left.timestamp,
            reason = ?reason,
            "session disconnected"
        );

        self.broadcaster.publish(left.clone()).await;
        left
    }

    /// 全セッションを切断する（サーバー停止時）
    ///
    /// # Returns
    ///
    /// 切断したセッション数
    pub async fn disconnect_all(&self) -> usize {
        let mut disconnected = 0;
        for handle in self.registry.snapshot().await {
            if self
                .execute(handle.token(), DisconnectReason::ServerShutdown)
                .await
                .is_some()
            {
                disconnected += 1;
            }
        }
        disconnected
    }

    /// 退去通知を処理するバックグラウンドタスクを起動
    ///
    /// 通知の送信側（`QueueBroadcaster`）がすべて破棄されると終了する。
    pub fn spawn_reaper(self: Arc<Self>, mut evictions: EvictionReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(token) = evictions.recv().await {
                self.execute(&token, DisconnectReason::Unresponsive).await;
            }
            tracing::debug!("eviction reaper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use chitchat_shared::{
        clock::{LamportClock, Timestamp},
        time::FixedWallClock,
    };
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{EventKind, MockEventBroadcaster, PublishReport, Username},
        infrastructure::{InMemorySessionRegistry, QueueBroadcaster},
    };

    fn create_test_registry() -> Arc<InMemorySessionRegistry> {
        Arc::new(InMemorySessionRegistry::new(
            Arc::new(LamportClock::new()),
            Arc::new(FixedWallClock::new(0)),
            32,
        ))
    }

    #[tokio::test]
    async fn test_disconnect_publishes_left_once() {
        // テスト項目: 同じセッションを 2 回切断しても Left は 1 回だけ配信される
        // given (前提条件):
        let registry = create_test_registry();
        let registration = registry
            .register(Username::new("alice").unwrap(), None)
            .await
            .unwrap();
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .withf(|event| matches!(&event.kind, EventKind::Left { username } if username.as_str() == "alice"))
            .times(1)
            .returning(|_| PublishReport::default());
        let clock = Arc::new(LamportClock::starting_at(5));
        let usecase = DisconnectSessionUseCase::new(registry.clone(), Arc::new(broadcaster), clock);

        // when (操作):
        let first = usecase
            .execute(&registration.token, DisconnectReason::ClientClosed)
            .await;
        let second = usecase
            .execute(&registration.token, DisconnectReason::TransportFailure)
            .await;

        // then (期待する結果):
        assert_eq!(first.unwrap().timestamp, Timestamp::Scalar(6));
        assert!(second.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_disconnect_signals_close_to_connection() {
        // テスト項目: 切断するとセッションの接続に close シグナルが届く
        // given (前提条件):
        let registry = create_test_registry();
        let registration = registry
            .register(Username::new("alice").unwrap(), None)
            .await
            .unwrap();
        let session = registry.authenticate(&registration.token).await.unwrap();
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .returning(|_| PublishReport::default());
        let usecase = DisconnectSessionUseCase::new(
            registry.clone(),
            Arc::new(broadcaster),
            Arc::new(LamportClock::new()),
        );

        // when (操作):
        usecase
            .execute(&registration.token, DisconnectReason::Unresponsive)
            .await;

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(1), session.handle.closed())
            .await
            .expect("close signal should be delivered");
    }

    #[tokio::test]
    async fn test_reaper_evicts_and_notifies_others() {
        // テスト項目: 退去通知を受けたリーパーがセッションを削除し、他のセッションに Left を配信する
        // given (前提条件):
        let registry = create_test_registry();
        let (broadcaster, _unused) = QueueBroadcaster::new(registry.clone());
        let broadcaster = Arc::new(broadcaster);
        let usecase = Arc::new(DisconnectSessionUseCase::new(
            registry.clone(),
            broadcaster,
            Arc::new(LamportClock::new()),
        ));

        let slow = registry
            .register(Username::new("slow").unwrap(), None)
            .await
            .unwrap();
        let watcher = registry
            .register(Username::new("watcher").unwrap(), None)
            .await
            .unwrap();
        let mut watcher_queue = registry.authenticate(&watcher.token).await.unwrap().queue;

        let (eviction_tx, eviction_rx) = mpsc::unbounded_channel();
        let reaper = usecase.clone().spawn_reaper(eviction_rx);

        // when (操作):
        eviction_tx.send(slow.token.clone()).unwrap();
        eviction_tx.send(slow.token.clone()).unwrap();
        drop(eviction_tx);
        reaper.await.unwrap();

        // then (期待する結果):
        let event = watcher_queue.recv().await.unwrap();
        assert!(matches!(event.kind, EventKind::Left { ref username } if username.as_str() == "slow"));
        assert!(watcher_queue.try_recv().is_err());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_all_closes_every_session() {
        // テスト項目: サーバー停止時に全セッションが切断され、それぞれの接続に close シグナルが届く
        // given (前提条件):
        let registry = create_test_registry();
        let mut handles = Vec::new();
        for name in ["alice", "bob"] {
            let registration = registry
                .register(Username::new(name).unwrap(), None)
                .await
                .unwrap();
            handles.push(registry.authenticate(&registration.token).await.unwrap().handle);
        }
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .times(2)
            .returning(|_| PublishReport::default());
        let usecase = DisconnectSessionUseCase::new(
            registry.clone(),
            Arc::new(broadcaster),
            Arc::new(LamportClock::new()),
        );

        // when (操作):
        let disconnected = usecase.disconnect_all().await;

        // then (期待する結果):
        assert_eq!(disconnected, 2);
        assert!(registry.is_empty().await);
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle.closed())
                .await
                .expect("close signal should be delivered");
        }
    }

    #[tokio::test]
    async fn test_pending_session_expires_and_frees_username() {
        // テスト項目: 期限までにストリームを開かなかったセッションは削除され、ユーザー名が再利用できる
        // given (前提条件):
        let registry = create_test_registry();
        let registration = registry
            .register(Username::new("alice").unwrap(), None)
            .await
            .unwrap();
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .withf(|event| matches!(&event.kind, EventKind::Left { username } if username.as_str() == "alice"))
            .times(1)
            .returning(|_| PublishReport::default());
        let usecase = Arc::new(DisconnectSessionUseCase::new(
            registry.clone(),
            Arc::new(broadcaster),
            Arc::new(LamportClock::new()),
        ));

        // when (操作): 認証しないまま期限を過ぎる
        let expired = usecase
            .spawn_pending_expiry(registration.token.clone(), Duration::from_millis(50))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(expired.is_some());
        assert!(registry.is_empty().await);
        assert!(
            registry
                .register(Username::new("alice").unwrap(), None)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_opened_stream_is_not_expired() {
        // テスト項目: 期限前にストリームを開いたセッションは削除されない
        // given (前提条件):
        let registry = create_test_registry();
        let registration = registry
            .register(Username::new("alice").unwrap(), None)
            .await
            .unwrap();
        let _session = registry.authenticate(&registration.token).await.unwrap();
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster.expect_publish().times(0);
        let usecase = Arc::new(DisconnectSessionUseCase::new(
            registry.clone(),
            Arc::new(broadcaster),
            Arc::new(LamportClock::new()),
        ));

        // when (操作):
        let expired = usecase
            .spawn_pending_expiry(registration.token.clone(), Duration::from_millis(50))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(expired.is_none());
        assert_eq!(registry.len().await, 1);
    }
}
