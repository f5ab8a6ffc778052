use crate::state::{Notice, NoticeKind};
use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;

fn notice_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "border-green-300 bg-green-50 text-green-800",
        NoticeKind::Warning => "border-amber-300 bg-amber-50 text-amber-800",
        NoticeKind::Error => "border-destructive/30 bg-red-50 text-destructive",
    }
}

#[component]
pub fn NoticeToast(notice: Notice, on_dismiss: Callback<u64>) -> impl IntoView {
    let id = notice.id;

    view! {
        <Alert class=format!("flex items-start gap-3 shadow-md {}", notice_class(notice.kind))>
            <AlertDescription class="flex-1">{notice.text}</AlertDescription>
            <button
                class="text-xs opacity-60 hover:opacity-100"
                aria-label="Dismiss"
                on:click=move |_| on_dismiss.run(id)
            >
                "✕"
            </button>
        </Alert>
    }
}
