//! Realtime transport.

mod websocket;

pub use websocket::{CHAT_PATH, InboundEvent, WebSocketChannel, websocket_url};
