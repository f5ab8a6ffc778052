use super::table::DataTable;
use crate::components::ui::{Alert, AlertDescription, Input};
use crate::listing::hook::ListHandle;
use crate::listing::{Column, ListRecord};
use leptos::prelude::*;

#[component]
pub fn PageHeader(#[prop(into)] title: String, #[prop(optional)] children: Option<Children>) -> impl IntoView {
    view! {
        <div class="mb-4 flex flex-wrap items-center justify-between gap-3">
            <h1 class="text-xl font-semibold tracking-tight">{title}</h1>
            {children.map(|c| c())}
        </div>
    }
}

#[component]
pub fn SearchBox(search: RwSignal<String>, #[prop(into)] placeholder: String) -> impl IntoView {
    view! {
        <div class="w-full max-w-xs">
            <Input r#type="search" placeholder=placeholder bind_value=search class="h-8 text-sm" />
        </div>
    }
}

#[component]
pub fn LoadError(#[prop(into)] error: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
            <Alert class="mb-4 border-destructive/30">
                <AlertDescription class="text-destructive text-xs">
                    {move || error.get().unwrap_or_default()}
                </AlertDescription>
            </Alert>
        </Show>
    }
}

/// Title, search box, load error and table for a read-only list.
#[component]
pub fn ListPage<R>(
    #[prop(into)] title: String,
    #[prop(into)] placeholder: String,
    list: ListHandle<R>,
    columns: Vec<Column<R>>,
) -> impl IntoView
where
    R: ListRecord + Send + Sync + 'static,
{
    let lv = list.view;
    let rows = Signal::derive(move || lv.with(|v| v.displayed().to_vec()));
    let loading = Signal::derive(move || lv.with(|v| v.loading()));
    let error = Signal::derive(move || lv.with(|v| v.error().map(str::to_string)));

    view! {
        <div>
            <PageHeader title=title>
                <SearchBox search=list.search placeholder=placeholder />
            </PageHeader>
            <LoadError error=error />
            <DataTable rows=rows columns=columns loading=loading />
        </div>
    }
}
