//! UseCase: ストリーム開始処理

use std::sync::Arc;

use crate::domain::{AuthenticatedSession, SessionRegistry, SessionToken};

use super::error::OpenStreamError;

/// ストリーム開始のユースケース
pub struct OpenStreamUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl OpenStreamUseCase {
    /// 新しい OpenStreamUseCase を作成
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// `authorization` ヘッダーの値を検証し、セッションの送信キューを受け取る
    ///
    /// ヘッダーがない、token が不正、または既にストリームが開かれている場合は
    /// `Unauthenticated`。
    pub async fn execute(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthenticatedSession, OpenStreamError> {
        let token = authorization
            .and_then(SessionToken::from_header)
            .ok_or(OpenStreamError::Unauthenticated)?;

        self.registry
            .authenticate(&token)
            .await
            .map_err(|_| OpenStreamError::Unauthenticated)
    }
}
