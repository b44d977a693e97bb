//! Connection Status Component

use leptos::*;

use crate::state::ChatState;

/// Colored dot mirroring the connection status
#[component]
pub fn StatusDot() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");

    view! {
        <span
            class="status-dot"
            style:background-color=move || state.status.get().indicator_color()
            aria-hidden="true"
        />
    }
}
