//! EventBroadcaster の実装
//!
//! - `queue`: セッションごとの有界キューへ配信する実装

pub mod queue;

pub use queue::{EvictionReceiver, QueueBroadcaster};
