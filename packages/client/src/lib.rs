//! Terminal chat client for Hiroba.
//!
//! Keeps an online roster and a date-ordered message thread in sync with
//! other sessions over a WebSocket channel, persisting users and messages
//! either in a local SQLite store or through the chat server's REST API.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry point
pub use ui::run;
