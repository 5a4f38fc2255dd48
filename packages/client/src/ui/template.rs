//! Handlebars templates for the terminal view.
//!
//! Two templates are registered: one roster entry (`user_item`) and one
//! chat message (`chat_message`). Each is rendered against the JSON form of
//! the entity, so `{{user.username}}`, `{{#if}}` and the other built-in
//! helpers are available.

use handlebars::Handlebars;
use serde_json::Value;
use thiserror::Error;

const USER_ITEM: &str = "user_item";
const CHAT_MESSAGE: &str = "chat_message";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid {name} template: {source}")]
    Compile {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// The compiled view templates
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Compile both templates; output is plain text, so nothing is escaped
    pub fn compile(user_item: &str, chat_message: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        register(&mut registry, USER_ITEM, user_item)?;
        register(&mut registry, CHAT_MESSAGE, chat_message)?;
        Ok(Self { registry })
    }

    pub fn user_item(&self, user: &Value) -> String {
        self.render(USER_ITEM, user)
    }

    pub fn chat_message(&self, message: &Value) -> String {
        self.render(CHAT_MESSAGE, message)
    }

    /// Missing fields render as empty; a helper failure renders an empty line
    fn render(&self, name: &str, value: &Value) -> String {
        self.registry.render(name, value).unwrap_or_else(|e| {
            tracing::warn!("Failed to render {} template: {}", name, e);
            String::new()
        })
    }
}

fn register(
    registry: &mut Handlebars<'static>,
    name: &'static str,
    source: &str,
) -> Result<(), TemplateError> {
    registry
        .register_template_string(name, source)
        .map_err(|e| TemplateError::Compile {
            name,
            source: Box::new(e),
        })
}
