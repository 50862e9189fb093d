//! EventBroadcaster trait 定義
//!
//! イベントを全ライブセッションへ配信するためのインターフェース。

use async_trait::async_trait;

use super::ServerEvent;

/// Outcome of one fanout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Sessions the event was enqueued for
    pub delivered: usize,
    /// Sessions whose queue was full (scheduled for eviction)
    pub dropped: usize,
    /// Sessions whose consumer was already gone
    pub closed: usize,
}

impl PublishReport {
    pub fn recipients(&self) -> usize {
        self.delivered + self.dropped + self.closed
    }
}

/// Event broadcaster trait
///
/// 配信はノンブロッキング。遅いセッションが他のセッションへの配信を
/// 遅らせることはない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    /// 全ライブセッションにイベントを配信する
    async fn publish(&self, event: ServerEvent) -> PublishReport;
}
