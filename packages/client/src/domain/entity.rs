//! Core domain models for the chat client.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    repository::Record,
    value_object::{MessageContent, MessageId, PasswordDigest, Timestamp, UserId, Username},
};

/// A chat user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Login name
    pub username: Username,
    /// Hashed password, only present on records read from a user store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordDigest>,
}

impl User {
    /// Create a new user
    pub fn new(id: UserId, username: Username, password: Option<PasswordDigest>) -> Self {
        Self {
            id,
            username,
            password,
        }
    }

    /// Copy of this user with the password digest stripped
    pub fn public(&self) -> Self {
        Self {
            id: self.id,
            username: self.username.clone(),
            password: None,
        }
    }

    /// Reference to this user as stored on a message
    pub fn author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.as_str().to_string(),
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "user";

    fn key(&self) -> u64 {
        self.id.value()
    }
}

/// The owning user of a message.
///
/// Peers may send only the id, so the username defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: MessageId,
    /// Who wrote the message
    pub user: Author,
    /// Message content
    pub content: MessageContent,
    /// When the message was written
    pub date: Timestamp,
}

impl Message {
    /// Create a new message
    pub fn new(id: MessageId, user: Author, content: MessageContent, date: Timestamp) -> Self {
        Self {
            id,
            user,
            content,
            date,
        }
    }
}

impl Record for Message {
    const COLLECTION: &'static str = "message";

    fn key(&self) -> u64 {
        self.id.value()
    }
}

/// Users currently known to be online, keyed by id.
///
/// Keeps insertion order; re-adding a known id replaces the entry in place.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    users: IndexMap<UserId, User>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user by id
    ///
    /// Returns `true` if the user was not in the roster before
    pub fn upsert(&mut self, user: User) -> bool {
        self.users.insert(user.id, user).is_none()
    }

    /// Remove a user by id, returning it if it was present.
    ///
    /// The remaining users keep their order.
    pub fn remove(&mut self, id: &UserId) -> Option<User> {
        self.users.shift_remove(id)
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Users in the order they came online
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Message history ordered by date ascending
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append messages and restore date order.
    ///
    /// The sort is stable, so messages sharing a date keep arrival order.
    pub fn append<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        self.messages.extend(messages);
        self.messages.sort_by_key(|m| m.date);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str) -> User {
        User::new(
            UserId::new(id),
            Username::new(name.to_string()).unwrap(),
            None,
        )
    }

    fn message(id: u64, date: i64) -> Message {
        Message::new(
            MessageId::new(id),
            user(1, "alice").author(),
            MessageContent::new(format!("message {id}")).unwrap(),
            Timestamp::new(date),
        )
    }

    #[test]
    fn test_roster_upsert_same_id_replaces_entry() {
        // テスト項目: 同じ ID のユーザーを追加すると置き換えられ、件数は変わらない
        // given (前提条件):
        let mut roster = Roster::new();
        roster.upsert(user(1, "alice"));
        roster.upsert(user(2, "bob"));

        // when (操作):
        let inserted = roster.upsert(user(1, "alice2"));

        // then (期待する結果): 位置も維持される
        assert!(!inserted);
        assert_eq!(roster.len(), 2);
        let names: Vec<&str> = roster.users().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice2", "bob"]);
    }

    #[test]
    fn test_roster_remove_unknown_is_noop() {
        // テスト項目: 存在しない ID の削除は何もしない
        // given (前提条件):
        let mut roster = Roster::new();
        roster.upsert(user(1, "alice"));

        // when (操作):
        let removed = roster.remove(&UserId::new(99));

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_remove_existing() {
        // テスト項目: 存在する ID のユーザーを削除できる
        // given (前提条件):
        let mut roster = Roster::new();
        roster.upsert(user(1, "alice"));
        roster.upsert(user(2, "bob"));

        // when (操作):
        let removed = roster.remove(&UserId::new(1));

        // then (期待する結果):
        assert_eq!(removed.map(|u| u.id), Some(UserId::new(1)));
        assert!(roster.get(&UserId::new(1)).is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_roster_remove_keeps_order_of_remaining_users() {
        // テスト項目: 削除後も残りのユーザーはログイン順のまま
        // given (前提条件):
        let mut roster = Roster::new();
        roster.upsert(user(1, "alice"));
        roster.upsert(user(2, "bob"));
        roster.upsert(user(3, "carol"));

        // when (操作):
        roster.remove(&UserId::new(1));

        // then (期待する結果):
        let ids: Vec<UserId> = roster.users().map(|u| u.id).collect();
        assert_eq!(ids, vec![UserId::new(2), UserId::new(3)]);
    }

    #[test]
    fn test_message_log_stays_sorted_after_every_append() {
        // テスト項目: 順不同で追加しても常に日時順に並ぶ
        // given (前提条件):
        let mut log = MessageLog::new();
        let batches = vec![
            vec![message(1, 300)],
            vec![message(2, 100), message(3, 500)],
            vec![message(4, 200)],
        ];

        for batch in batches {
            // when (操作):
            log.append(batch);

            // then (期待する結果):
            let dates: Vec<i64> = log.messages().iter().map(|m| m.date.value()).collect();
            let mut sorted = dates.clone();
            sorted.sort();
            assert_eq!(dates, sorted);
        }
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_message_log_equal_dates_keep_arrival_order() {
        // テスト項目: 同じ日時のメッセージは到着順を保つ
        // given (前提条件):
        let mut log = MessageLog::new();

        // when (操作):
        log.append(vec![message(1, 100)]);
        log.append(vec![message(2, 100)]);

        // then (期待する結果):
        let ids: Vec<u64> = log.messages().iter().map(|m| m.id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_message_accepts_author_without_username() {
        // テスト項目: ユーザー名のない author を含むメッセージを読み込める
        // given (前提条件):
        let json = r#"{"id":9,"user":{"id":2},"content":"hi","date":100}"#;

        // when (操作):
        let message: Message = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(message.user.id, UserId::new(2));
        assert_eq!(message.user.username, "");
        assert_eq!(message.date, Timestamp::new(100));
    }

    #[test]
    fn test_public_user_drops_password() {
        // テスト項目: 公開用ユーザーにはパスワードが含まれない
        // given (前提条件):
        let mut alice = user(1, "alice");
        alice.password = Some(PasswordDigest::from_password("secret").unwrap());

        // when (操作):
        let json = serde_json::to_value(alice.public()).unwrap();

        // then (期待する結果):
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }
}
