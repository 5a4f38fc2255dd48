//! Domain layer for the chat client.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod channel;
pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use channel::{ChannelEvent, RealtimeChannel};
pub use entity::{Author, Message, MessageLog, Roster, User};
pub use error::{ChannelError, RepositoryError, ValueObjectError};
pub use factory::{MessageIdFactory, UserIdFactory};
pub use repository::{Adapter, AttributeFilter, Record, UserBackend};
pub use value_object::{MessageContent, MessageId, PasswordDigest, Timestamp, UserId, Username};
