use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-4 rounded-xl border py-6 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1.5 px-6"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardContent, div, "px-6"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
}

pub use components::*;

/// Dashboard tile: a count that links to its list page.
#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] href: String,
    #[prop(into)] count: Signal<usize>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let class = tw_merge::tw_merge!(
        "block rounded-xl border p-5 shadow-sm transition-shadow hover:shadow-md",
        class
    );

    view! {
        <a href=href class=class>
            <div class="text-sm font-medium text-muted-foreground">{title}</div>
            <div class="mt-2 text-3xl font-semibold tabular-nums">{move || count.get()}</div>
        </a>
    }
}
