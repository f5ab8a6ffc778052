use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Covers the viewport while the session is being resolved.
#[component]
pub fn PageSpinner(#[prop(into, optional)] label: String) -> impl IntoView {
    view! {
        <div class="flex min-h-screen items-center justify-center bg-background">
            <div class="flex flex-col items-center gap-3 text-sm text-muted-foreground">
                <Spinner class="size-8 text-primary" />
                {label}
            </div>
        </div>
    }
}
