//! Infrastructure layer: persistence backends and the realtime transport.

pub mod dto;
pub mod realtime;
pub mod repository;
