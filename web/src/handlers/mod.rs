//! HTTP request handlers.

pub mod events;
pub mod health;
pub mod tickets;
pub mod wallet;
