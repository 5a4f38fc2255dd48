//! In-process stub of the chat server used by the integration tests.
//!
//! Serves the `users` and `messages` collections from memory, the two
//! custom user endpoints, and a `/chat` WebSocket that echoes text frames
//! back to the sender.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::Value;
use tokio::task::JoinHandle;

/// How the stub answers on `/chat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Echo,
    CloseImmediately,
}

#[derive(Default)]
pub struct StubState {
    collections: Mutex<HashMap<&'static str, BTreeMap<u64, Value>>>,
    tokens: Mutex<Vec<String>>,
    chat_clients: Mutex<Vec<String>>,
    chat_mode: Mutex<Option<ChatMode>>,
}

impl StubState {
    fn record_token(&self, headers: &HeaderMap) {
        if let Some(token) = headers
            .get("webclienttoken")
            .and_then(|value| value.to_str().ok())
        {
            self.tokens.lock().unwrap().push(token.to_string());
        }
    }

    fn upsert(&self, collection: &'static str, body: Value) -> Option<Value> {
        let id = body.get("id")?.as_u64()?;
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .insert(id, body.clone());
        Some(body)
    }

    fn all(&self, collection: &'static str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn field_matches(item: &Value, key: &str, expected: &str) -> bool {
    let pointer = format!("/{}", key.replace('.', "/"));
    match item.pointer(&pointer) {
        Some(Value::String(actual)) => actual == expected,
        Some(actual) => actual.to_string() == expected,
        None => false,
    }
}

fn collection_routes(name: &'static str) -> Router<Arc<StubState>> {
    let base = format!("/{name}");
    let query = format!("/{name}/");
    let item = format!("/{name}/{{id}}");

    Router::new()
        .route(
            &base,
            get(
                move |State(state): State<Arc<StubState>>, headers: HeaderMap| async move {
                    state.record_token(&headers);
                    Json(state.all(name))
                },
            )
            .post(
                move |State(state): State<Arc<StubState>>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| async move {
                    state.record_token(&headers);
                    match state.upsert(name, body) {
                        Some(stored) => Json(stored).into_response(),
                        None => StatusCode::BAD_REQUEST.into_response(),
                    }
                },
            )
            .put(
                move |State(state): State<Arc<StubState>>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| async move {
                    state.record_token(&headers);
                    match state.upsert(name, body) {
                        Some(stored) => Json(stored).into_response(),
                        None => StatusCode::BAD_REQUEST.into_response(),
                    }
                },
            ),
        )
        .route(
            &query,
            get(
                move |State(state): State<Arc<StubState>>,
                      headers: HeaderMap,
                      Query(filter): Query<HashMap<String, String>>| async move {
                    state.record_token(&headers);
                    let matched: Vec<Value> = state
                        .all(name)
                        .into_iter()
                        .filter(|item| {
                            filter
                                .iter()
                                .all(|(key, expected)| field_matches(item, key, expected))
                        })
                        .collect();
                    Json(matched)
                },
            ),
        )
        .route(
            &item,
            get(
                move |State(state): State<Arc<StubState>>, Path(id): Path<u64>| async move {
                    let found = state
                        .collections
                        .lock()
                        .unwrap()
                        .get(name)
                        .and_then(|items| items.get(&id).cloned());
                    match found {
                        Some(value) => Json(value).into_response(),
                        None => StatusCode::NOT_FOUND.into_response(),
                    }
                },
            )
            .delete(
                move |State(state): State<Arc<StubState>>, Path(id): Path<u64>| async move {
                    let removed = state
                        .collections
                        .lock()
                        .unwrap()
                        .get_mut(name)
                        .and_then(|items| items.remove(&id));
                    match removed {
                        Some(_) => StatusCode::NO_CONTENT,
                        None => StatusCode::NOT_FOUND,
                    }
                },
            ),
        )
}

async fn authenticate(
    State(state): State<Arc<StubState>>,
    Path((username, digest)): Path<(String, String)>,
) -> Json<Vec<Value>> {
    let users = state
        .all("users")
        .into_iter()
        .filter(|user| {
            field_matches(user, "username", &username) && field_matches(user, "password", &digest)
        })
        .collect();
    Json(users)
}

async fn by_username(
    State(state): State<Arc<StubState>>,
    Path(username): Path<String>,
) -> Json<Vec<Value>> {
    let users = state
        .all("users")
        .into_iter()
        .filter(|user| field_matches(user, "username", &username))
        .collect();
    Json(users)
}

async fn chat(
    ws: WebSocketUpgrade,
    State(state): State<Arc<StubState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if let Some(client_id) = query.get("client_id") {
        state.chat_clients.lock().unwrap().push(client_id.clone());
    }
    let mode = state.chat_mode.lock().unwrap().unwrap_or(ChatMode::Echo);
    ws.on_upgrade(move |socket| handle_chat(socket, mode))
}

async fn handle_chat(mut socket: WebSocket, mode: ChatMode) {
    if mode == ChatMode::CloseImmediately {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ChatMode::Echo).await
    }

    pub async fn start_with(mode: ChatMode) -> Self {
        let state = Arc::new(StubState::default());
        *state.chat_mode.lock().unwrap() = Some(mode);

        let app = Router::new()
            .merge(collection_routes("users"))
            .merge(collection_routes("messages"))
            .route("/users/auth/{username}/{digest}", post(authenticate))
            .route("/users/by-username/{username}", get(by_username))
            .route("/chat", get(chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seed(&self, collection: &'static str, body: Value) {
        self.state.upsert(collection, body);
    }

    pub fn stored(&self, collection: &'static str) -> Vec<Value> {
        self.state.all(collection)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.state.tokens.lock().unwrap().clone()
    }

    pub fn chat_clients(&self) -> Vec<String> {
        self.state.chat_clients.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
