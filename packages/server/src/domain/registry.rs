//! SessionRegistry trait 定義
//!
//! ライブセッションの管理に必要なインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use chitchat_shared::clock::Timestamp;

use super::{
    AuthenticatedSession, Registration, RegistryError, SessionHandle, SessionSummary,
    SessionToken, Username,
};

/// Session registry trait
///
/// 接続中のセッションを token とユーザー名で管理する。
///
/// ## 不変条件
///
/// - ライブセッションのユーザー名は一意
/// - セッションは高々 1 回だけ削除される（`remove` が `Some` を返すのは 1 回だけ）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// ユーザー名を予約してセッションを作成し、token を発行する
    ///
    /// `timestamp` はクライアントの開始時刻。`Some` ならサーバーの時計にマージ
    /// され、`None` ならサーバーの時計を 1 tick 進める。
    async fn register(
        &self,
        username: Username,
        timestamp: Option<Timestamp>,
    ) -> Result<Registration, RegistryError>;

    /// token を検証し、セッションの送信キューを受け取る
    ///
    /// キューを受け取れるのは 1 回だけ。2 回目以降は `Unauthenticated`。
    async fn authenticate(&self, token: &SessionToken)
    -> Result<AuthenticatedSession, RegistryError>;

    /// セッションを削除し、ユーザー名を解放する
    async fn remove(&self, token: &SessionToken) -> Option<SessionHandle>;

    /// ストリームがまだ開かれていない場合に限り、セッションを削除する
    ///
    /// `authenticate` と同じロックの中で判定するため、ストリームを開いた
    /// 直後のセッションを誤って削除することはない。
    async fn remove_pending(&self, token: &SessionToken) -> Option<SessionHandle>;

    /// ファンアウト用に、全ライブセッションのハンドルを取得
    async fn snapshot(&self) -> Vec<SessionHandle>;

    /// 全ライブセッションの概要をユーザー名順で取得
    async fn list(&self) -> Vec<SessionSummary>;
}
