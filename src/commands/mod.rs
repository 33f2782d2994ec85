//! CLI command implementations.

pub mod block;
pub mod list;
pub mod unblock;
pub mod wipe;
