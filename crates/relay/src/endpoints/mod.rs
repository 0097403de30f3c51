//! # Relayエンドポイント

pub mod health;
pub mod proxy;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use health::{handle_health, handle_root};
pub use proxy::handle_proxy;
