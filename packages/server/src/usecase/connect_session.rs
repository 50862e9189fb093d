//! UseCase: ハンドシェイク処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - ユーザー名の検証、セッション登録、Joined イベントの配信
//!
//! ### なぜこのテストが必要か
//! - 重複したユーザー名での接続を防ぐ
//! - Joined イベントが登録時のタイムスタンプで配信されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ユーザーの接続
//! - 異常系：不正なユーザー名、使用中のユーザー名

use std::sync::Arc;

use chitchat_shared::clock::Timestamp;

use crate::domain::{
    EventBroadcaster, Registration, RegistryError, ServerEvent, SessionRegistry, Username,
};

use super::error::ConnectError;

/// ハンドシェイクのユースケース
pub struct ConnectSessionUseCase {
    /// SessionRegistry（セッション管理の抽象化）
    registry: Arc<dyn SessionRegistry>,
    /// EventBroadcaster（イベント配信の抽象化）
    broadcaster: Arc<dyn EventBroadcaster>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>, broadcaster: Arc<dyn EventBroadcaster>) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// ハンドシェイクを実行
    ///
    /// # Arguments
    ///
    /// * `username` - 希望するユーザー名（未検証）
    /// * `timestamp` - クライアントの開始時刻（省略可）
    ///
    /// # Returns
    ///
    /// * `Ok(Registration)` - 発行した token と、マージ後のサーバー時刻
    /// * `Err(ConnectError)` - 不正なユーザー名、または使用中のユーザー名
    pub async fn execute(
        &self,
        username: &str,
        timestamp: Option<Timestamp>,
    ) -> Result<Registration, ConnectError> {
        // 1. ユーザー名の検証
        let username = Username::new(username).map_err(ConnectError::InvalidUsername)?;

        // 2. セッション登録（一意性チェック + token 発行 + 時計のマージ）
        let registration = self
            .registry
            .register(username, timestamp)
            .await
            .map_err(|error| match error {
                RegistryError::UsernameTaken(username) => ConnectError::UsernameTaken(username),
                other => ConnectError::Registry(other),
            })?;

        tracing::info!(
            username = %registration.username,
            timestamp = %registration.timestamp,
            "session registered"
        );

        // 3. 新規参加者を含む全員に Joined を配信（レジストリのロック外）
        let joined = ServerEvent::joined(
            registration.username.clone(),
            registration.timestamp.clone(),
        );
        self.broadcaster.publish(joined).await;

        Ok(registration)
    }
}
