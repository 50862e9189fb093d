//! Infrastructure layer
//!
//! ドメイン層が定義する trait の具体的な実装と、ワイヤフォーマットとの変換。

pub mod broadcaster;
pub mod dto;
pub mod registry;

pub use broadcaster::{EvictionReceiver, QueueBroadcaster};
pub use registry::InMemorySessionRegistry;
