//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectSessionUseCase, DisconnectSessionUseCase, ListSessionsUseCase, OpenStreamUseCase,
    SendMessageUseCase,
};

/// Shared application state, handed to every handler
pub struct AppState {
    /// ConnectSessionUseCase（ハンドシェイクのユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// OpenStreamUseCase（ストリーム開始のユースケース）
    pub open_stream_usecase: Arc<OpenStreamUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectSessionUseCase（切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// ListSessionsUseCase（セッション一覧のユースケース）
    pub list_sessions_usecase: Arc<ListSessionsUseCase>,
    /// ハンドシェイク後、ストリームを開くまでの猶予
    pub stream_open_timeout: Duration,
}
