//! Data transfer objects for external interfaces.

pub mod realtime;
