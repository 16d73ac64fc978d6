//! Core domain + application logic for the RSS Telegram broadcaster.
//!
//! This crate is intentionally framework-agnostic. Telegram and the
//! subscription database live behind ports (traits) implemented in adapter
//! crates; the dispatcher only sees structured rejections and store calls.

pub mod classify;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gateway;
pub mod logging;
pub mod store;

pub use errors::{Error, Result};
