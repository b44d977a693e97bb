//! App Root Component
//!
//! Chat card with connection status, message history and composer.

use leptos::*;

use crate::components::{Composer, MessageList, StatusDot};
use crate::state::{provide_chat_state, websocket_url, ChatSocket};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide chat state to all components
    let state = provide_chat_state();

    // Open the WebSocket connection for the lifetime of the app
    let socket = ChatSocket::connect(&websocket_url(), state);
    provide_context(socket.clone());
    on_cleanup(move || socket.close());

    view! {
        <div class="page">
            <div class="card">
                <header class="header">
                    <div>
                        <h1 class="title">"Live Chat"</h1>
                        <p class="subtitle">
                            "WebSocket connection status: "
                            {move || state.status.get().label()}
                        </p>
                    </div>
                    <StatusDot />
                </header>

                <MessageList />

                <Composer />
            </div>
        </div>
    }
}
