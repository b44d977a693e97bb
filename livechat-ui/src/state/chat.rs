//! Chat State
//!
//! Reactive state for the chat page using Leptos signals, plus the small
//! rules the components share.

use leptos::*;

/// WebSocket connection status as shown in the header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Error => "Error",
        }
    }

    /// Status dot color: green when connected, amber while connecting, red otherwise
    pub fn indicator_color(self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "#22c55e",
            ConnectionStatus::Connecting => "#f59e0b",
            ConnectionStatus::Disconnected | ConnectionStatus::Error => "#ef4444",
        }
    }
}

/// Where a message came from, judged locally
///
/// The wire carries no sender field, so a message typed here is `Sent` and
/// every inbound frame is `Received`, including the server's echo of our own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Sent,
    Received,
}

impl Origin {
    pub fn author(self) -> &'static str {
        match self {
            Origin::Sent => "You",
            Origin::Received => "Server",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Origin::Sent => "message sent",
            Origin::Received => "message received",
        }
    }
}

/// One entry in the message list
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    /// Local key for the list, never sent anywhere
    pub id: u64,
    pub text: String,
    /// Local wall-clock time the entry was added
    pub timestamp: String,
    pub origin: Origin,
}

impl ChatMessage {
    pub fn new(id: u64, text: String, origin: Origin) -> Self {
        Self {
            id,
            text,
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            origin,
        }
    }

    /// e.g. "You · 14:02:11"
    pub fn footer(&self) -> String {
        format!("{} · {}", self.origin.author(), self.timestamp)
    }
}

/// Whether the composer has anything worth sending
pub fn can_send(input: &str) -> bool {
    !input.trim().is_empty()
}

/// The text actually transmitted for a composer value, if any
pub fn outgoing_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Chat state provided to all components
#[derive(Clone, Copy)]
pub struct ChatState {
    /// WebSocket connection status
    pub status: RwSignal<ConnectionStatus>,
    /// Message history, oldest first
    pub messages: RwSignal<Vec<ChatMessage>>,
    next_id: StoredValue<u64>,
}

/// Create the chat state and provide it to the component tree
pub fn provide_chat_state() -> ChatState {
    let state = ChatState {
        status: create_rw_signal(ConnectionStatus::Connecting),
        messages: create_rw_signal(Vec::new()),
        next_id: store_value(0),
    };

    provide_context(state);
    state
}

impl ChatState {
    /// Record a message this client just sent
    pub fn push_sent(&self, text: String) {
        self.push(text, Origin::Sent);
    }

    /// Record a frame received from the server
    pub fn push_received(&self, text: String) {
        self.push(text, Origin::Received);
    }

    fn push(&self, text: String, origin: Origin) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        let message = ChatMessage::new(id, text, origin);
        self.messages.update(|messages| messages.push(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Connecting.label(), "Connecting...");
        assert_eq!(ConnectionStatus::Connected.label(), "Connected");
        assert_eq!(ConnectionStatus::Disconnected.label(), "Disconnected");
        assert_eq!(ConnectionStatus::Error.label(), "Error");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(ConnectionStatus::Connected.indicator_color(), "#22c55e");
        assert_eq!(ConnectionStatus::Connecting.indicator_color(), "#f59e0b");
        assert_eq!(
            ConnectionStatus::Error.indicator_color(),
            ConnectionStatus::Disconnected.indicator_color()
        );
    }

    #[test]
    fn test_blank_input_cannot_be_sent() {
        assert!(!can_send(""));
        assert!(!can_send("   \t\n"));
        assert_eq!(outgoing_text("  "), None);
    }

    #[test]
    fn test_outgoing_text_is_trimmed() {
        assert!(can_send("  hi "));
        assert_eq!(outgoing_text("  hi there \n").as_deref(), Some("hi there"));
    }

    #[test]
    fn test_message_footer() {
        let sent = ChatMessage::new(0, "hi".to_string(), Origin::Sent);
        assert!(sent.footer().starts_with("You · "));
        assert_eq!(sent.timestamp.len(), "00:00:00".len());

        let received = ChatMessage::new(1, "hi".to_string(), Origin::Received);
        assert!(received.footer().starts_with("Server · "));
        assert_eq!(received.origin.css_class(), "message received");
    }
}
