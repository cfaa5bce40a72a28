//! Uzum Market seller API integration.

pub mod client;
pub mod dto;
pub mod normalize;
pub mod settings;

pub use client::UzumClient;
pub use settings::{UzumConfig, UzumHttpConfig};
