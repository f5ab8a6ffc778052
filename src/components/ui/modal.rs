use leptos::prelude::*;
use tw_merge::tw_merge;

/// Centered dialog over a dimmed backdrop. Rendered only while `open` is true; clicking the
/// backdrop calls `on_close`.
#[component]
pub fn Modal(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: Signal<String>,
    on_close: Callback<()>,
    #[prop(into, optional)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let panel_class = tw_merge!(
        "w-full max-w-md rounded-md border border-border bg-background p-4 shadow-lg",
        class
    );
    let children = StoredValue::new(children);

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div
                class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4"
                on:click=move |_| on_close.run(())
            >
                <div
                    class=panel_class.clone()
                    role="dialog"
                    aria-modal="true"
                    on:click=|ev| ev.stop_propagation()
                >
                    <div class="mb-3 text-sm font-medium">{move || title.get()}</div>
                    {move || children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}
