//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 受信したタイムスタンプのマージ、メッセージ長の検証、配信
//!
//! ### なぜこのテストが必要か
//! - 配信されるイベントのタイムスタンプが、受信時のサーバー時刻以上であることを保証
//! - 長すぎるメッセージが配信されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージの配信
//! - 異常系：長すぎるメッセージ（時計は進むが、配信はされない）

use std::sync::Arc;

use chitchat_shared::clock::{LogicalClock, Timestamp};

use crate::domain::{EventBroadcaster, MessageText, PublishReport, ServerEvent, Username};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// プロセス全体で共有する論理時計
    clock: Arc<dyn LogicalClock>,
    /// EventBroadcaster（イベント配信の抽象化）
    broadcaster: Arc<dyn EventBroadcaster>,
    /// メッセージの最大文字数
    max_message_length: usize,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        clock: Arc<dyn LogicalClock>,
        broadcaster: Arc<dyn EventBroadcaster>,
        max_message_length: usize,
    ) -> Self {
        Self {
            clock,
            broadcaster,
            max_message_length,
        }
    }

    /// メッセージ送信を実行
    ///
    /// 受信の時点で時計をマージするため、メッセージが破棄される場合でも
    /// 時計は進む。
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のユーザー名
    /// * `text` - メッセージ本文（未検証）
    /// * `claimed` - クライアントが付けたタイムスタンプ
    ///
    /// # Returns
    ///
    /// * `Ok(PublishReport)` - 配信結果
    /// * `Err(SendMessageError)` - メッセージが長すぎる
    pub async fn execute(
        &self,
        sender: &Username,
        text: String,
        claimed: &Timestamp,
    ) -> Result<PublishReport, SendMessageError> {
        // 1. 受信したタイムスタンプをマージ
        let synced = self.clock.sync(claimed);

        // 2. メッセージ長の検証
        let text = MessageText::new(text, self.max_message_length)?;

        tracing::debug!(username = %sender, timestamp = %synced, "message accepted");

        // 3. 全員に配信
        let event = ServerEvent::message(sender.clone(), text, synced);
        Ok(self.broadcaster.publish(event).await)
    }
}

#[cfg(test)]
mod tests {
    use chitchat_shared::clock::{ClockKind, LamportClock, VectorTimestamp};

    use super::*;
    use crate::domain::{EventKind, MockEventBroadcaster, ValueObjectError};

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[tokio::test]
    async fn test_send_message_is_stamped_with_synced_timestamp() {
        // テスト項目: メッセージが max(local, remote) + 1 のタイムスタンプで配信される
        // given (前提条件):
        let clock = Arc::new(LamportClock::starting_at(2));
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .withf(|event| {
                event.timestamp == Timestamp::Scalar(6)
                    && matches!(&event.kind, EventKind::Message { text, .. } if text.as_str() == "hi")
            })
            .times(1)
            .returning(|_| PublishReport {
                delivered: 2,
                ..PublishReport::default()
            });
        let usecase = SendMessageUseCase::new(clock.clone(), Arc::new(broadcaster), 128);

        // when (操作):
        let result = usecase
            .execute(&alice(), "hi".to_string(), &Timestamp::Scalar(5))
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap().delivered, 2);
        assert_eq!(clock.now(), 6);
    }

    #[tokio::test]
    async fn test_send_message_timestamp_is_not_below_server_clock() {
        // テスト項目: 古いタイムスタンプのメッセージでもサーバー時刻より大きい値が付く
        // given (前提条件):
        let clock = Arc::new(LamportClock::starting_at(10));
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .withf(|event| event.timestamp == Timestamp::Scalar(11))
            .times(1)
            .returning(|_| PublishReport::default());
        let usecase = SendMessageUseCase::new(clock, Arc::new(broadcaster), 128);

        // when (操作):
        let result = usecase
            .execute(&alice(), "late".to_string(), &Timestamp::Scalar(1))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_too_long_is_dropped_after_sync() {
        // テスト項目: 129 文字のメッセージは配信されないが、時計はマージされる
        // given (前提条件):
        let clock = Arc::new(LamportClock::new());
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster.expect_publish().never();
        let usecase = SendMessageUseCase::new(clock.clone(), Arc::new(broadcaster), 128);

        // when (操作):
        let result = usecase
            .execute(&alice(), "a".repeat(129), &Timestamp::Scalar(3))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::InvalidMessage(
                ValueObjectError::MessageTooLong {
                    length: 129,
                    max: 128
                }
            ))
        );
        assert_eq!(clock.now(), 4);
    }

    #[tokio::test]
    async fn test_send_message_with_vector_clock() {
        // テスト項目: ベクトル時計では送信者のエントリがマージされる
        // given (前提条件):
        let clock = ClockKind::Vector.build("server");
        let mut broadcaster = MockEventBroadcaster::new();
        broadcaster
            .expect_publish()
            .withf(|event| {
                event.timestamp
                    == Timestamp::Vector(VectorTimestamp::from_iter([("alice", 2), ("server", 1)]))
            })
            .times(1)
            .returning(|_| PublishReport::default());
        let usecase = SendMessageUseCase::new(clock, Arc::new(broadcaster), 128);
        let claimed = Timestamp::Vector(VectorTimestamp::from_iter([("alice", 2)]));

        // when (操作):
        let result = usecase.execute(&alice(), "hi".to_string(), &claimed).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
