//! Oga2mp3 - OGA to MP3 conversion service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod conversion;
pub mod server;

pub use config::{load_config, load_config_or_default, Config};
