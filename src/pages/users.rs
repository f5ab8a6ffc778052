use super::list::{LoadError, PageHeader, SearchBox};
use super::table::DataTable;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Input, Label, Modal, Spinner};
use crate::dashboard::USERS_SOURCE;
use crate::listing::hook::use_list_view;
use crate::listing::{compare_text, compare_time, delete_record, Cell, Column, DateRange, ListRecord};
use crate::models::UserRecord;
use crate::state::{AppContext, NoticeKind};
use crate::util::{display_value, format_ist, format_ist_value};
use chrono::NaiveDate;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use std::cmp::Ordering;

fn newest_first(a: &UserRecord, b: &UserRecord) -> Ordering {
    compare_time(b.created_at(), a.created_at())
}

/// Both ends are required; a half-filled picker means no range.
pub(crate) fn parse_range(start: &str, end: &str) -> Option<DateRange> {
    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    Some(DateRange::new(parse(start)?, parse(end)?))
}

pub(crate) fn detail_value(key: &str, value: &Value) -> String {
    if key == "createdAt" {
        return format_ist_value(Some(value));
    }
    let text = display_value(value);
    if text.trim().is_empty() {
        "N/A".to_string()
    } else {
        text
    }
}

fn opt_text(v: &Option<String>) -> Cell {
    Cell::text_or_na(v.as_deref().unwrap_or_default())
}

pub(crate) fn user_columns() -> Vec<Column<UserRecord>> {
    vec![
        Column::<UserRecord> { title: "FB ID", cell: |u| Cell::Muted(u.id.clone()), sort: None },
        Column::<UserRecord> {
            title: "UUID",
            cell: |u| opt_text(&u.uuid),
            sort: Some(|a, b| {
                compare_text(a.uuid.as_deref().unwrap_or(""), b.uuid.as_deref().unwrap_or(""))
            }),
        },
        Column::<UserRecord> {
            title: "Created At",
            cell: |u| match u.created_at() {
                Some(at) => Cell::Text(format_ist(&at)),
                None => Cell::Muted("N/A".to_string()),
            },
            sort: Some(|a, b| compare_time(a.created_at(), b.created_at())),
        },
        Column::<UserRecord> { title: "Device Name", cell: |u| opt_text(&u.device_name), sort: None },
        Column::<UserRecord> { title: "OS Name", cell: |u| opt_text(&u.os_name), sort: None },
        Column::<UserRecord> { title: "Brand", cell: |u| opt_text(&u.brand), sort: None },
        Column::<UserRecord> { title: "Model Name", cell: |u| opt_text(&u.model_name), sort: None },
    ]
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let list = use_list_view::<UserRecord>(USERS_SOURCE, Some(newest_first));
    let lv = list.view;

    let range_start: RwSignal<String> = RwSignal::new(String::new());
    let range_end: RwSignal<String> = RwSignal::new(String::new());

    Effect::new(move |_| {
        let range = parse_range(&range_start.get(), &range_end.get());
        list.range.set(range);
    });

    let on_clear_range = move |_| {
        range_start.set(String::new());
        range_end.set(String::new());
    };

    // Details dialog
    let selected: RwSignal<Option<UserRecord>> = RwSignal::new(None);

    // Delete confirmation
    let pending_delete: RwSignal<Option<UserRecord>> = RwSignal::new(None);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = {
        let app_state = app_state.clone();
        move |_| {
            let Some(user) = pending_delete.get_untracked() else {
                return;
            };
            if deleting.get_untracked() {
                return;
            }
            deleting.set(true);

            let store = app_state.0.store.clone();
            let app_state = app_state.clone();
            spawn_local(async move {
                match delete_record(store.as_ref(), &USERS_SOURCE, &user.id).await {
                    Ok(()) => {
                        lv.try_update(|v| v.remove(&user.id));
                        app_state.0.notify(NoticeKind::Success, "User deleted successfully");
                    }
                    Err(e) => {
                        app_state
                            .0
                            .notify(NoticeKind::Error, format!("Failed to delete user: {e}"));
                    }
                }
                deleting.try_set(false);
                pending_delete.try_set(None);
            });
        }
    };

    let rows = Signal::derive(move || lv.with(|v| v.displayed().to_vec()));
    let loading = Signal::derive(move || lv.with(|v| v.loading()));
    let error = Signal::derive(move || lv.with(|v| v.error().map(str::to_string)));

    let details = move || {
        selected
            .get()
            .map(|u| {
                u.all_fields()
                    .into_iter()
                    .map(|(k, v)| {
                        let value = detail_value(&k, &v);
                        view! {
                            <div class="grid grid-cols-3 gap-2 border-b py-1.5 text-sm last:border-0">
                                <div class="font-medium text-muted-foreground">{k}</div>
                                <div class="col-span-2 break-all">{value}</div>
                            </div>
                        }
                    })
                    .collect_view()
            })
    };

    let delete_label = move || {
        pending_delete
            .get()
            .and_then(|u| u.uuid.clone())
            .unwrap_or_else(|| "this user".to_string())
    };

    view! {
        <div>
            <PageHeader title="Users">
                <div class="flex flex-wrap items-end gap-2">
                    <SearchBox search=list.search placeholder="Search by UUID" />
                    <div class="flex items-center gap-1.5">
                        <Label html_for="range-start" class="text-xs">"From"</Label>
                        <Input id="range-start" r#type="date" bind_value=range_start class="h-8 w-36 text-sm" />
                    </div>
                    <div class="flex items-center gap-1.5">
                        <Label html_for="range-end" class="text-xs">"To"</Label>
                        <Input id="range-end" r#type="date" bind_value=range_end class="h-8 w-36 text-sm" />
                    </div>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_clear_range>
                        "Clear"
                    </Button>
                </div>
            </PageHeader>

            <LoadError error=error />

            <DataTable
                rows=rows
                columns=user_columns()
                loading=loading
                on_view=Callback::new(move |u: UserRecord| selected.set(Some(u)))
                on_delete=Callback::new(move |u: UserRecord| pending_delete.set(Some(u)))
            />

            <Modal
                open=Signal::derive(move || selected.get().is_some())
                title="User details".to_string()
                on_close=Callback::new(move |_| selected.set(None))
                class="max-w-lg"
            >
                <div class="max-h-[60vh] overflow-y-auto">{details}</div>
                <div class="mt-4 flex justify-end">
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| selected.set(None)>
                        "Close"
                    </Button>
                </div>
            </Modal>

            <Modal
                open=Signal::derive(move || pending_delete.get().is_some())
                title="Delete user".to_string()
                on_close=Callback::new(move |_| {
                    if !deleting.get_untracked() {
                        pending_delete.set(None);
                    }
                })
            >
                <p class="text-sm text-muted-foreground">
                    "Are you sure you want to delete "
                    <span class="font-medium text-foreground">{delete_label}</span>
                    "? This cannot be undone."
                </p>
                <div class="mt-4 flex justify-end gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || deleting.get()
                        on:click=move |_| pending_delete.set(None)
                    >
                        "Cancel"
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=move || deleting.get()
                        on:click=on_confirm_delete.clone()
                    >
                        <Show when=move || deleting.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Delete"
                    </Button>
                </div>
            </Modal>
        </div>
    }
}
