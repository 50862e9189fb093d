//! Data Transfer Objects
//!
//! The wire types themselves live in `chitchat_shared::protocol` so the
//! client can use them too; this module only converts domain values into them.

pub mod conversion;
