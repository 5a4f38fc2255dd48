//! Realtime channel message DTOs.
//!
//! Every WebSocket text frame carries one envelope:
//!
//! ```text
//! {"event": "user-login",  "data": {"id": 1, "username": "alice"}}
//! {"event": "user-logout", "data": {"id": 1}}
//! {"event": "chat",        "data": {"id": 9, "user": {"id": 2}, "content": "hi", "date": 100}}
//! {"event": "pulse",       "data": "<session id>"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{
    Author, ChannelEvent, Message, MessageContent, MessageId, Timestamp, User, UserId, Username,
    ValueObjectError,
};

/// Event envelope sent and received over the realtime channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum EventEnvelope {
    UserLogin(UserDto),
    UserLogout(AuthorDto),
    Chat(MessageDto),
    Pulse(String),
}

/// User as announced to other sessions (never carries the password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: u64,
    #[serde(default)]
    pub username: String,
}

/// Owner of a chat message, or the user leaving on `user-logout`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: u64,
    #[serde(default)]
    pub username: String,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: u64,
    pub user: AuthorDto,
    pub content: String,
    /// Unix timestamp (milliseconds since epoch)
    pub date: i64,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            username: user.username.as_str().to_string(),
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = ValueObjectError;

    fn try_from(dto: UserDto) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::new(dto.id),
            Username::new(dto.username)?,
            None,
        ))
    }
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.value(),
            username: author.username.clone(),
        }
    }
}

impl From<AuthorDto> for Author {
    fn from(dto: AuthorDto) -> Self {
        Author {
            id: UserId::new(dto.id),
            username: dto.username,
        }
    }
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            user: (&message.user).into(),
            content: message.content.as_str().to_string(),
            date: message.date.value(),
        }
    }
}

impl TryFrom<MessageDto> for Message {
    type Error = ValueObjectError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        Ok(Message::new(
            MessageId::new(dto.id),
            dto.user.into(),
            MessageContent::new(dto.content)?,
            Timestamp::new(dto.date),
        ))
    }
}

impl From<&ChannelEvent> for EventEnvelope {
    fn from(event: &ChannelEvent) -> Self {
        match event {
            ChannelEvent::UserLogin(user) => EventEnvelope::UserLogin(user.into()),
            ChannelEvent::UserLogout(author) => EventEnvelope::UserLogout(author.into()),
            ChannelEvent::Chat(message) => EventEnvelope::Chat(message.into()),
            ChannelEvent::Pulse(session_id) => EventEnvelope::Pulse(session_id.clone()),
        }
    }
}

impl TryFrom<EventEnvelope> for ChannelEvent {
    type Error = ValueObjectError;

    fn try_from(envelope: EventEnvelope) -> Result<Self, Self::Error> {
        Ok(match envelope {
            EventEnvelope::UserLogin(user) => ChannelEvent::UserLogin(user.try_into()?),
            EventEnvelope::UserLogout(author) => ChannelEvent::UserLogout(author.into()),
            EventEnvelope::Chat(message) => ChannelEvent::Chat(message.try_into()?),
            EventEnvelope::Pulse(session_id) => ChannelEvent::Pulse(session_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PasswordDigest;

    #[test]
    fn test_user_login_envelope_omits_password() {
        // テスト項目: user-login イベントにはパスワードが含まれない
        // given (前提条件):
        let user = User::new(
            UserId::new(1),
            Username::new("alice".to_string()).unwrap(),
            Some(PasswordDigest::from_password("secret").unwrap()),
        );

        // when (操作):
        let envelope = EventEnvelope::from(&ChannelEvent::UserLogin(user));
        let json = serde_json::to_value(&envelope).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"event": "user-login", "data": {"id": 1, "username": "alice"}})
        );
    }

    #[test]
    fn test_chat_envelope_with_bare_author_parses() {
        // テスト項目: author が ID のみの chat イベントを受信できる
        // given (前提条件):
        let text = r#"{"event":"chat","data":{"id":9,"user":{"id":2},"content":"hi","date":100}}"#;

        // when (操作):
        let envelope: EventEnvelope = serde_json::from_str(text).unwrap();
        let event = ChannelEvent::try_from(envelope).unwrap();

        // then (期待する結果):
        match event {
            ChannelEvent::Chat(message) => {
                assert_eq!(message.id, MessageId::new(9));
                assert_eq!(message.user.id, UserId::new(2));
                assert_eq!(message.content.as_str(), "hi");
                assert_eq!(message.date, Timestamp::new(100));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_user_logout_with_only_id_parses() {
        // テスト項目: ID のみの user-logout イベントを受信できる
        // given (前提条件):
        let text = r#"{"event":"user-logout","data":{"id":2}}"#;

        // when (操作):
        let envelope: EventEnvelope = serde_json::from_str(text).unwrap();
        let event = ChannelEvent::try_from(envelope).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ChannelEvent::UserLogout(Author {
                id: UserId::new(2),
                username: String::new(),
            })
        );
    }

    #[test]
    fn test_user_login_without_username_is_rejected() {
        // テスト項目: ユーザー名のない user-login イベントはドメインモデルに変換できない
        // given (前提条件):
        let envelope: EventEnvelope =
            serde_json::from_str(r#"{"event":"user-login","data":{"id":2}}"#).unwrap();

        // when (操作):
        let result = ChannelEvent::try_from(envelope);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::UsernameEmpty));
    }

    #[test]
    fn test_pulse_envelope_shape() {
        // テスト項目: pulse イベントはセッション ID を data に持つ
        // when (操作):
        let envelope = EventEnvelope::from(&ChannelEvent::Pulse("abc".to_string()));

        // then (期待する結果):
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"event":"pulse","data":"abc"}"#
        );
    }

    #[test]
    fn test_chat_with_empty_content_is_rejected() {
        // テスト項目: 空の内容を持つ chat イベントはドメインモデルに変換できない
        // given (前提条件):
        let envelope = EventEnvelope::Chat(MessageDto {
            id: 1,
            user: AuthorDto {
                id: 1,
                username: String::new(),
            },
            content: String::new(),
            date: 0,
        });

        // when (操作):
        let result = ChannelEvent::try_from(envelope);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MessageContentEmpty));
    }
}
