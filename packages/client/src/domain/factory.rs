//! Domain factories for creating entity identifiers.

use super::{MessageId, UserId};

/// Ids are kept within 53 bits so they survive a round trip through any
/// JSON peer that stores numbers as doubles.
const ID_MASK: u64 = (1 << 53) - 1;

fn random_id() -> u64 {
    let (high, low) = uuid::Uuid::new_v4().as_u64_pair();
    (high ^ low) & ID_MASK
}

/// Factory for generating UserId instances.
pub struct UserIdFactory;

impl UserIdFactory {
    /// Generate a new UserId from a random UUID v4.
    pub fn generate() -> UserId {
        UserId::new(random_id())
    }
}

/// Factory for generating MessageId instances.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId from a random UUID v4.
    pub fn generate() -> MessageId {
        MessageId::new(random_id())
    }
}
