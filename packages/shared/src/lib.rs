//! Shared utilities for Hiroba packages.

pub mod logger;
pub mod time;
