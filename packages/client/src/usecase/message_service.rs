//! Entity Service: messages

use std::sync::Arc;

use crate::domain::{Adapter, Message, RepositoryError};

/// Typed message operations over the message adapter
#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn Adapter<Message>>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn Adapter<Message>>) -> Self {
        Self { messages }
    }

    /// Full message history as stored by the backend
    pub async fn get_all_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        self.messages.get_all().await
    }

    /// Persist messages (upsert by id) and return what was stored
    pub async fn add_messages(&self, messages: Vec<Message>) -> Result<Vec<Message>, RepositoryError> {
        self.messages.add(messages).await
    }
}
