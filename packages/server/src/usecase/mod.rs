//! UseCase layer
//!
//! ハンドラーから呼ばれるアプリケーションのユースケース。ドメイン層の trait
//! （`SessionRegistry`, `EventBroadcaster`）にのみ依存する。

pub mod connect_session;
pub mod disconnect_session;
pub mod error;
pub mod list_sessions;
pub mod open_stream;
pub mod send_message;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ConnectError, OpenStreamError, SendMessageError};
pub use list_sessions::ListSessionsUseCase;
pub use open_stream::OpenStreamUseCase;
pub use send_message::SendMessageUseCase;
