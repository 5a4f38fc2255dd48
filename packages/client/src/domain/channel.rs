//! Realtime channel contract.

use super::{Author, ChannelError, Message, User};

/// Events exchanged with other sessions over the realtime channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A user came online
    UserLogin(User),
    /// A user went offline; peers may send only the id
    UserLogout(Author),
    /// A chat message was published
    Chat(Message),
    /// Liveness heartbeat carrying the session id (client to server only)
    Pulse(String),
}

impl ChannelEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ChannelEvent::UserLogin(_) => "user-login",
            ChannelEvent::UserLogout(_) => "user-logout",
            ChannelEvent::Chat(_) => "chat",
            ChannelEvent::Pulse(_) => "pulse",
        }
    }
}

/// Outbound side of the realtime channel
#[cfg_attr(test, mockall::automock)]
pub trait RealtimeChannel: Send + Sync {
    /// Queue an event for the server.
    ///
    /// # Errors
    ///
    /// `ChannelError::Closed` once the transport is gone
    fn emit(&self, event: ChannelEvent) -> Result<(), ChannelError>;

    /// Identifier of this connection, sent with every pulse
    fn session_id(&self) -> String;
}
