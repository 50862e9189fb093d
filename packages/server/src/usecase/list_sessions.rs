//! UseCase: 接続中のセッション一覧

use std::sync::Arc;

use crate::domain::{SessionRegistry, SessionSummary};

/// セッション一覧取得のユースケース
pub struct ListSessionsUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl ListSessionsUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// ユーザー名順のセッション一覧
    pub async fn execute(&self) -> Vec<SessionSummary> {
        self.registry.list().await
    }
}
