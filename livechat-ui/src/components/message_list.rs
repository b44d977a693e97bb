//! Message List Component
//!
//! Scrolling history of sent and received messages.

use leptos::*;

use crate::state::{ChatMessage, ChatState};

/// Message history, or a placeholder while it is empty
#[component]
pub fn MessageList() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");

    view! {
        <section class="message-list">
            <Show
                when=move || state.messages.with(|messages| !messages.is_empty())
                fallback=|| view! { <p class="empty-state">"No messages yet. Say hello!"</p> }
            >
                <For
                    each=move || state.messages.get()
                    key=|message| message.id
                    children=|message| view! { <MessageItem message=message /> }
                />
            </Show>
        </section>
    }
}

#[component]
fn MessageItem(message: ChatMessage) -> impl IntoView {
    let footer = message.footer();

    view! {
        <article class=message.origin.css_class()>
            <div class="message-text">{message.text}</div>
            <div class="message-time">{footer}</div>
        </article>
    }
}
