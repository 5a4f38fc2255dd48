//! Remote persistence over the HTTP JSON API.

mod rest;
mod user_backend;

pub use rest::{CLIENT_TOKEN_HEADER, RestAdapter, build_http_client};
pub use user_backend::RemoteUserBackend;
