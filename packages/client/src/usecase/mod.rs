//! UseCase 層
//!
//! Entity Service を実装するレイヤー。
//! UI 層（Session Controller）から呼び出され、Domain 層の trait を操作します。

pub mod error;
pub mod message_service;
pub mod user_service;

pub use error::SessionError;
pub use message_service::MessageService;
pub use user_service::UserService;
