//! WebSocket Client
//!
//! Connection to the chat server. Frames are plain text in both directions.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::chat::{ChatState, ConnectionStatus};

/// Port the chat server listens on
pub const SERVER_PORT: u16 = 3000;

/// WebSocket client for the chat
#[derive(Clone)]
pub struct ChatSocket {
    ws: Rc<RefCell<Option<WebSocket>>>,
}

impl ChatSocket {
    /// Open a connection and wire its events into `state`
    pub fn connect(url: &str, state: ChatState) -> Self {
        let client = Self {
            ws: Rc::new(RefCell::new(None)),
        };

        state.status.set(ConnectionStatus::Connecting);

        match WebSocket::new(url) {
            Ok(ws) => {
                setup_handlers(&ws, state);
                *client.ws.borrow_mut() = Some(ws);
            }
            Err(e) => {
                web_sys::console::error_1(&format!("WebSocket connection failed: {:?}", e).into());
                state.status.set(ConnectionStatus::Error);
            }
        }

        client
    }

    /// Send a text frame; fails unless the socket is open
    pub fn send(&self, text: &str) -> Result<(), String> {
        let ws_guard = self.ws.borrow();
        let ws = ws_guard.as_ref().ok_or("WebSocket not connected")?;

        if ws.ready_state() != WebSocket::OPEN {
            return Err("WebSocket not open".to_string());
        }

        ws.send_with_str(text).map_err(|e| format!("{:?}", e))
    }

    /// Detach the event handlers and close the connection
    pub fn close(&self) {
        if let Some(ws) = self.ws.borrow_mut().take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
    }
}

/// Set up WebSocket event handlers
fn setup_handlers(ws: &WebSocket, state: ChatState) {
    // On open
    let on_open = Closure::wrap(Box::new(move |_: JsValue| {
        web_sys::console::log_1(&"WebSocket connected".into());
        state.status.set(ConnectionStatus::Connected);
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    // On message
    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(text) = event.data().dyn_into::<js_sys::JsString>() {
            state.push_received(text.into());
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    // On close
    let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
        web_sys::console::log_1(
            &format!("WebSocket closed: code={}, reason={}", event.code(), event.reason()).into(),
        );
        state.status.set(ConnectionStatus::Disconnected);
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();

    // On error
    let on_error = Closure::wrap(Box::new(move |e: JsValue| {
        web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
        state.status.set(ConnectionStatus::Error);
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();
}

/// Chat server URL for the host this page was served from
pub fn websocket_url() -> String {
    let host = web_sys::window()
        .and_then(|window| window.location().hostname().ok())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    server_url(&host)
}

fn server_url(host: &str) -> String {
    format!("ws://{}:{}", host, SERVER_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url() {
        assert_eq!(server_url("localhost"), "ws://localhost:3000");
        assert_eq!(server_url("192.168.1.20"), "ws://192.168.1.20:3000");
    }
}
