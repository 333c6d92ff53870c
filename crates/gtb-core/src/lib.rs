//! Core domain + application logic for the Gemini Telegram relay bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the Gemini
//! API live behind ports (traits) implemented in adapter crates.

pub mod chat;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod history;
pub mod logging;
pub mod ports;
pub mod security;

pub use errors::{Error, Result};
