//! Presentation: redraws the roster and the message thread.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use super::template::{TemplateError, Templates};
use crate::domain::{Message, User};

/// Default template for one roster entry
pub const DEFAULT_USER_ITEM_TEMPLATE: &str = "{{username}}";

/// Default template for one chat message
pub const DEFAULT_CHAT_MESSAGE_TEMPLATE: &str = "{{user.username}}: {{content}}";

/// Rendering surface driven by the session controller.
///
/// Every call replaces what was shown before; there is no incremental update.
#[cfg_attr(test, mockall::automock)]
pub trait View: Send {
    fn update_user_list(&mut self, users: &[User]);

    /// `messages` is already sorted by date
    fn update_message_list(&mut self, messages: &[Message]);
}

/// View that prints compiled templates to a terminal (or any writer)
pub struct TerminalView<W> {
    templates: Templates,
    out: W,
}

impl<W: Write + Send> TerminalView<W> {
    /// Compile both templates up front
    pub fn new(user_item: &str, chat_message: &str, out: W) -> Result<Self, TemplateError> {
        Ok(Self {
            templates: Templates::compile(user_item, chat_message)?,
            out,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, title: &str, lines: Vec<String>) {
        let mut block = format!("── {title} ──\n");
        for line in lines {
            block.push_str(&line);
            block.push('\n');
        }
        if let Err(e) = self
            .out
            .write_all(block.as_bytes())
            .and_then(|()| self.out.flush())
        {
            tracing::warn!("Failed to redraw {}: {}", title, e);
        }
    }
}

fn to_value<T: Serialize>(entity: &T) -> Value {
    serde_json::to_value(entity).unwrap_or(Value::Null)
}

impl<W: Write + Send> View for TerminalView<W> {
    fn update_user_list(&mut self, users: &[User]) {
        let lines = users
            .iter()
            .map(|user| self.templates.user_item(&to_value(&user.public())))
            .collect();
        self.draw(&format!("online ({})", users.len()), lines);
    }

    fn update_message_list(&mut self, messages: &[Message]) {
        let lines = messages
            .iter()
            .map(|message| {
                let mut value = to_value(message);
                if let Value::Object(fields) = &mut value {
                    fields.insert(
                        "time".to_string(),
                        Value::String(hiroba_shared::time::format_local_time(
                            message.date.value(),
                        )),
                    );
                }
                self.templates.chat_message(&value)
            })
            .collect();
        self.draw("messages", lines);
    }
}
