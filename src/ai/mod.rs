//! Language-model integration: completion client, prompts, retry and chat.

mod chat;
mod client;
mod error;
mod prompt;
mod retry;

pub use chat::*;
pub use client::*;
pub use error::*;
pub use prompt::*;
pub use retry::*;
