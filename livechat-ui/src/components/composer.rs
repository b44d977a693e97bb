//! Composer Component
//!
//! Text input and send button.

use leptos::*;

use crate::state::{can_send, outgoing_text, ChatSocket, ChatState};

/// Message form; the button stays disabled while the input is blank
#[component]
pub fn Composer() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");
    let socket = use_context::<ChatSocket>().expect("ChatSocket not found");

    let (input, set_input) = create_signal(String::new());
    let sendable = create_memo(move |_| input.with(|value| can_send(value)));

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let Some(text) = outgoing_text(&input.get_untracked()) else {
            return;
        };

        // Nothing is queued while the socket is not open
        if let Err(e) = socket.send(&text) {
            web_sys::console::warn_1(&format!("Message not sent: {}", e).into());
            return;
        }

        state.push_sent(text);
        set_input.set(String::new());
    };

    view! {
        <form class="composer" on:submit=on_submit>
            <input
                type="text"
                class="composer-input"
                placeholder="Type your message..."
                aria-label="Chat message"
                prop:value=input
                on:input=move |ev| set_input.set(event_target_value(&ev))
            />
            <button type="submit" class="composer-button" disabled=move || !sendable.get()>
                "Send"
            </button>
        </form>
    }
}
