//! Core domain + application logic for the homework status watcher.
//!
//! This crate is intentionally framework-agnostic. The status API and
//! Telegram live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod parse;
pub mod poller;
pub mod ports;
pub mod verdicts;

pub use errors::{Error, Result};
