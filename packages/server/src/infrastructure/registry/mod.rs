//! SessionRegistry の実装
//!
//! - `inmemory`: HashMap を使ったプロセス内の実装

pub mod inmemory;

pub use inmemory::InMemorySessionRegistry;
