//! Session Controller
//!
//! Owns the session state (current user, roster, message log) and mediates
//! every change between the realtime channel, the entity services and the
//! view. Every mutation of the roster or the log ends with a redraw.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 認証、プレゼンスイベント、チャットイベント、メッセージ送信、切断時の処理
//!
//! ### なぜこのテストが必要か
//! - 認証失敗時にセッションが未認証のまま、何も送信されないことを保証
//! - メッセージログが常に日時順であることを保証
//! - 保存に失敗したメッセージがログにも送信にも現れないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン後に履歴を読み込み、受信と送信が日時順に並ぶ
//! - 異常系：認証失敗、保存失敗、未ログインでの送信
//! - エッジケース：名簿にいないユーザーのログアウト、同じ ID のログイン

use crate::{
    domain::{
        Author, ChannelEvent, Message, MessageContent, MessageIdFactory, MessageLog, Roster,
        Timestamp, User,
    },
    usecase::SessionError,
};

use super::state::AppContext;

pub struct SessionController {
    context: AppContext,
    current_user: Option<User>,
    roster: Roster,
    log: MessageLog,
}

impl SessionController {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            current_user: None,
            roster: Roster::new(),
            log: MessageLog::new(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// Log in and start the session.
    ///
    /// On success the user is announced to other sessions, joins the
    /// roster, and the stored history is merged into the log. On failure
    /// nothing is set or emitted.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<User, SessionError> {
        let user = self
            .context
            .user_service
            .authenticate(username, password)
            .await?;
        tracing::info!("Logged in as '{}' ({})", user.username, user.id);

        self.current_user = Some(user.clone());
        self.emit(ChannelEvent::UserLogin(user.public()));
        self.roster.upsert(user.public());
        self.render_users();

        match self.context.message_service.get_all_messages().await {
            Ok(history) => {
                tracing::debug!("Loaded {} message(s) of history", history.len());
                self.add_messages(history);
            }
            Err(e) => tracing::error!("Failed to load message history: {}", e),
        }

        Ok(user)
    }

    /// Create an account; does not log in
    pub async fn register(&self, username: &str, password: &str) -> Result<User, SessionError> {
        self.context.user_service.register(username, password).await
    }

    /// Dispatch an event received from another session
    pub async fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::UserLogin(user) => self.add_existing_user(user).await,
            ChannelEvent::UserLogout(author) => self.remove_user(&author),
            ChannelEvent::Chat(message) => self.persist_messages(vec![message]).await,
            ChannelEvent::Pulse(session_id) => {
                tracing::debug!("Ignoring pulse from '{}'", session_id);
            }
        }
    }

    /// Another session logged in: remember the user and show it online
    pub async fn add_existing_user(&mut self, user: User) {
        match self
            .context
            .user_service
            .add_existing_users(vec![user.clone()])
            .await
        {
            Ok(_) => tracing::info!("User, {}, successfully added", user.username),
            Err(e) => tracing::warn!("Failed to store user '{}': {}", user.username, e),
        }
        self.roster.upsert(user);
        self.render_users();
    }

    /// Another session logged out; unknown ids are ignored
    pub fn remove_user(&mut self, user: &Author) {
        if self.roster.remove(&user.id).is_none() {
            tracing::debug!("User {} was not in the roster", user.id);
        }
        self.render_users();
    }

    /// Store messages received over the channel, then show them.
    ///
    /// Relies on the adapters' upsert-by-id contract, so a message that is
    /// already stored is not duplicated.
    pub async fn persist_messages(&mut self, messages: Vec<Message>) {
        match self
            .context
            .message_service
            .add_messages(messages.clone())
            .await
        {
            Ok(_) => self.add_messages(messages),
            Err(e) => tracing::error!("Failed to save received message(s): {}", e),
        }
    }

    /// Merge messages into the log (kept sorted by date) and redraw
    pub fn add_messages(&mut self, messages: Vec<Message>) {
        self.log.append(messages);
        self.context.view.update_message_list(self.log.messages());
    }

    /// Write a message as the current user.
    ///
    /// The message is persisted first; only what the backend stored is
    /// broadcast and appended. A failed save leaves the log untouched and
    /// emits nothing.
    pub async fn publish_message(&mut self, content: &str) -> Result<Vec<Message>, SessionError> {
        let author = self
            .current_user
            .as_ref()
            .ok_or(SessionError::NotAuthenticated)?
            .author();
        let content = MessageContent::new(content.to_string())?;
        let message = Message::new(MessageIdFactory::generate(), author, content, Timestamp::now());

        let stored = match self
            .context
            .message_service
            .add_messages(vec![message])
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to save message: {}", e);
                return Err(SessionError::Persistence(e));
            }
        };

        for message in &stored {
            self.emit(ChannelEvent::Chat(message.clone()));
        }
        self.add_messages(stored.clone());
        Ok(stored)
    }

    /// Transport dropped: announce the current user's logout (best-effort)
    /// and end the session, so a later [`Self::logout`] stays silent
    pub fn handle_disconnect(&mut self, reason: &str) {
        tracing::warn!("Realtime channel disconnected: {}", reason);
        self.announce_logout();
        self.current_user = None;
    }

    /// Leave the session on purpose
    pub fn logout(&mut self) {
        self.announce_logout();
        if let Some(user) = self.current_user.take() {
            tracing::info!("Logged out '{}'", user.username);
        }
    }

    /// Redraw the roster without changing it
    pub fn render_users(&mut self) {
        let users: Vec<User> = self.roster.users().cloned().collect();
        self.context.view.update_user_list(&users);
    }

    fn announce_logout(&self) {
        if let Some(user) = &self.current_user {
            self.emit(ChannelEvent::UserLogout(user.author()));
        }
    }

    fn emit(&self, event: ChannelEvent) {
        let name = event.name();
        if let Err(e) = self.context.channel.emit(event) {
            tracing::warn!("Failed to emit '{}': {}", name, e);
        }
    }
}
