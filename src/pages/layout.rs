use crate::components::ui::{Button, ButtonSize, ButtonVariant, NoticeToast};
use crate::routes::AppRoute;
use crate::state::{AppContext, Notice};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_location;
use wasm_bindgen::JsCast;

fn nav_item_class(active: bool, collapsed: bool) -> String {
    let base = "flex items-center gap-2 rounded-md px-2 py-1.5 text-sm transition-colors";
    let state = if active {
        "bg-accent font-medium text-accent-foreground"
    } else {
        "text-muted-foreground hover:bg-accent/60 hover:text-foreground"
    };
    let align = if collapsed { "justify-center" } else { "" };
    format!("{base} {state} {align}")
}

fn initial(label: &str) -> String {
    label.chars().next().map(String::from).unwrap_or_default()
}

/// Sidebar shell shared by every signed-in page.
#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sidebar_collapsed = app_state.0.sidebar_collapsed;
    let notices = app_state.0.notices;

    let location = use_location();
    let pathname = move || location.pathname.get();

    let sidebar_width_class = move || {
        if sidebar_collapsed.get() {
            "w-14"
        } else {
            "w-56"
        }
    };

    let on_toggle_sidebar = {
        let app_state = app_state.clone();
        move |_| app_state.0.toggle_sidebar()
    };

    // Keyboard shortcuts:
    // - Cmd/Ctrl+B: toggle sidebar
    // - Esc: dismiss notices
    let key_handle = {
        let app_state = app_state.clone();
        window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
            let is_meta = ev.meta_key() || ev.ctrl_key();
            let key = ev.key().to_lowercase();

            // Leave typing alone.
            let typing = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .map(|el| matches!(el.tag_name().to_lowercase().as_str(), "input" | "textarea"))
                .unwrap_or(false);

            if is_meta && key == "b" && !typing {
                ev.prevent_default();
                app_state.0.toggle_sidebar();
                return;
            }

            if key == "escape" {
                notices.update(|b| {
                    let ids: Vec<u64> = b.items().iter().map(|n| n.id).collect();
                    for id in ids {
                        b.dismiss(id);
                    }
                });
            }
        })
    };
    on_cleanup(move || key_handle.remove());

    let on_logout = {
        let app_state = app_state.clone();
        move |_| {
            let gate = app_state.0.gate.clone();
            spawn_local(async move {
                gate.sign_out().await;
            });
        }
    };

    let nav = move || {
        let collapsed = sidebar_collapsed.get();
        let current = AppRoute::from_path(&pathname());
        AppRoute::menu()
            .map(|route| {
                let active = current == Some(route);
                let label = route.label();
                view! {
                    <a
                        href=route.path()
                        class=nav_item_class(active, collapsed)
                        title=label
                        aria-current=if active { Some("page") } else { None }
                    >
                        {if collapsed { initial(label) } else { label.to_string() }}
                    </a>
                }
            })
            .collect_view()
    };

    let dismiss = Callback::new(move |id: u64| notices.update(|b| b.dismiss(id)));

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <div class="flex min-h-screen w-full gap-4 px-4 py-6">
                <aside class=move || format!("{} shrink-0 transition-[width]", sidebar_width_class())>
                    <div class="sticky top-6 space-y-4">
                        <div class="flex items-center justify-between gap-1">
                            <a href="/" class="text-sm font-semibold text-foreground">
                                <Show when=move || !sidebar_collapsed.get() fallback=|| view! { "W" }>
                                    "World Info"
                                </Show>
                            </a>

                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Icon
                                on:click=on_toggle_sidebar
                                attr:title="Toggle sidebar (Ctrl+B)"
                                class="h-8 w-8"
                            >
                                <span class="text-xs text-muted-foreground">
                                    {move || if sidebar_collapsed.get() { ">" } else { "<" }}
                                </span>
                            </Button>
                        </div>

                        <nav class="flex flex-col gap-1" aria-label="Main">{nav}</nav>

                        <div class="border-t pt-3">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=on_logout
                                class="w-full"
                            >
                                {move || if sidebar_collapsed.get() { "⎋" } else { "Sign out" }}
                            </Button>
                        </div>
                    </div>
                </aside>

                <main class="min-w-0 flex-1">{children()}</main>
            </div>

            <div class="fixed right-4 top-4 z-50 flex w-80 flex-col gap-2">
                <For
                    each=move || notices.with(|b| b.items().to_vec())
                    key=|n: &Notice| n.id
                    children=move |n| view! { <NoticeToast notice=n on_dismiss=dismiss /> }
                />
            </div>
        </div>
    }
}
