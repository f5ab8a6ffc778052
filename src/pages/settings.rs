use super::list::{LoadError, PageHeader};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Input, Label, Modal, Spinner, Table, TableBody, TableCell,
    TableHead, TableHeader, TableRow, TableWrapper,
};
use crate::config_editor::{delete_entry, load_config, upsert_field, ConfigDraft, ConfigEditor, EditMode};
use crate::listing::Liveness;
use crate::state::{AppContext, NoticeKind};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let editor: RwSignal<ConfigEditor> = RwSignal::new(ConfigEditor::default());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let alive = Liveness::new();

    {
        let store = app_state.0.store.clone();
        let alive = alive.clone();
        spawn_local(async move {
            let result = load_config(store.as_ref()).await;
            if !alive.is_alive() {
                return;
            }
            match result {
                Ok(loaded) => {
                    editor.try_set(loaded);
                }
                Err(e) => {
                    log::error!("failed to load configuration: {e}");
                    load_error.try_set(Some(e.message));
                }
            }
            loading.try_set(false);
        });
    }
    on_cleanup(move || alive.kill());

    // Add / edit dialog
    let form_open: RwSignal<bool> = RwSignal::new(false);
    let form_mode: RwSignal<EditMode> = RwSignal::new(EditMode::Add);
    let form_key: RwSignal<String> = RwSignal::new(String::new());
    let form_value: RwSignal<String> = RwSignal::new(String::new());
    let form_error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let open_form = move |draft: ConfigDraft| {
        form_mode.set(draft.mode);
        form_key.set(draft.key);
        form_value.set(draft.value);
        form_error.set(None);
        form_open.set(true);
    };

    let on_save = {
        let app_state = app_state.clone();
        move |_| {
            if saving.get_untracked() {
                return;
            }
            let draft = ConfigDraft {
                mode: form_mode.get_untracked(),
                key: form_key.get_untracked(),
                value: form_value.get_untracked(),
            };
            let snapshot = editor.get_untracked();

            // Validation failures stay in the dialog and never reach the store.
            if let Err(e) = snapshot.validate(&draft) {
                app_state.0.notify(NoticeKind::Warning, e.message.clone());
                form_error.set(Some(e.message));
                return;
            }

            saving.set(true);
            form_error.set(None);
            let store = app_state.0.store.clone();
            let app_state = app_state.clone();
            spawn_local(async move {
                match upsert_field(store.as_ref(), &snapshot, &draft).await {
                    Ok((key, value)) => {
                        editor.try_update(|e| e.apply_upsert(key, value));
                        let msg = match draft.mode {
                            EditMode::Add => "Configuration added",
                            EditMode::Edit => "Configuration updated",
                        };
                        app_state.0.notify(NoticeKind::Success, msg);
                        form_open.try_set(false);
                    }
                    Err(e) if e.is_transport() => {
                        app_state
                            .0
                            .notify(NoticeKind::Error, format!("Failed to save configuration: {e}"));
                        form_error.try_set(Some(e.message));
                    }
                    Err(e) => {
                        app_state.0.notify(NoticeKind::Warning, e.message.clone());
                        form_error.try_set(Some(e.message));
                    }
                }
                saving.try_set(false);
            });
        }
    };

    // Delete confirmation
    let pending_delete: RwSignal<Option<String>> = RwSignal::new(None);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = {
        let app_state = app_state.clone();
        move |_| {
            let Some(key) = pending_delete.get_untracked() else {
                return;
            };
            if deleting.get_untracked() {
                return;
            }
            deleting.set(true);
            let store = app_state.0.store.clone();
            let app_state = app_state.clone();
            spawn_local(async move {
                match delete_entry(store.as_ref(), &key).await {
                    Ok(()) => {
                        editor.try_update(|e| e.apply_delete(&key));
                        app_state.0.notify(NoticeKind::Success, "Configuration deleted");
                    }
                    Err(e) => {
                        app_state
                            .0
                            .notify(NoticeKind::Error, format!("Failed to delete configuration: {e}"));
                    }
                }
                deleting.try_set(false);
                pending_delete.try_set(None);
            });
        }
    };

    let rows = move || {
        if loading.get() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=3 class="py-10">
                        <div class="flex justify-center"><Spinner class="size-6" /></div>
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        let entries: Vec<(String, String)> = editor.with(|e| {
            e.entries()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        });
        if entries.is_empty() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=3 class="py-10 text-center text-muted-foreground">
                        "No configuration yet"
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        entries
            .into_iter()
            .map(|(key, value)| {
                let edit_key = key.clone();
                let edit_value = value.clone();
                let delete_key = key.clone();
                view! {
                    <TableRow>
                        <TableCell class="font-mono text-xs">{key}</TableCell>
                        <TableCell class="break-all">{value}</TableCell>
                        <TableCell>
                            <div class="flex gap-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| open_form(ConfigDraft::edit(&edit_key, &edit_value))
                                >
                                    "Edit"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    on:click=move |_| pending_delete.set(Some(delete_key.clone()))
                                >
                                    "Delete"
                                </Button>
                            </div>
                        </TableCell>
                    </TableRow>
                }
            })
            .collect_view()
            .into_any()
    };

    let form_title = Signal::derive(move || match form_mode.get() {
        EditMode::Add => "Add configuration".to_string(),
        EditMode::Edit => "Edit configuration".to_string(),
    });
    let key_locked = Signal::derive(move || form_mode.get() == EditMode::Edit);

    view! {
        <div>
            <PageHeader title="Settings">
                <Button size=ButtonSize::Sm on:click=move |_| open_form(ConfigDraft::add())>
                    "Add configuration"
                </Button>
            </PageHeader>

            <LoadError error=load_error />

            <div class="space-y-3">
                <TableWrapper>
                    <Table>
                        <TableHeader>
                            <TableRow>
                                <TableHead>"Key"</TableHead>
                                <TableHead>"Value"</TableHead>
                                <TableHead>"Actions"</TableHead>
                            </TableRow>
                        </TableHeader>
                        <TableBody>{rows}</TableBody>
                    </Table>
                </TableWrapper>
                <div class="px-1 text-xs text-muted-foreground">
                    {move || format!("Total {} items", editor.with(|e| e.len()))}
                </div>
            </div>

            <Modal
                open=form_open
                title=form_title
                on_close=Callback::new(move |_| {
                    if !saving.get_untracked() {
                        form_open.set(false);
                    }
                })
            >
                <div class="space-y-3">
                    <div class="space-y-1">
                        <Label html_for="config-key" class="text-xs">"Key"</Label>
                        <Input
                            id="config-key"
                            bind_value=form_key
                            placeholder="e.g. maxUsers"
                            disabled=key_locked
                            class="h-8 text-sm"
                        />
                    </div>
                    <div class="space-y-1">
                        <Label html_for="config-value" class="text-xs">"Value"</Label>
                        <Input id="config-value" bind_value=form_value class="h-8 text-sm" />
                    </div>

                    <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                        <div class="text-xs text-destructive">{move || form_error.get().unwrap_or_default()}</div>
                    </Show>

                    <div class="flex justify-end gap-2 pt-1">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || saving.get()
                            on:click=move |_| form_open.set(false)
                        >
                            "Cancel"
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || saving.get()
                            on:click=on_save.clone()
                        >
                            <Show when=move || saving.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Save"
                        </Button>
                    </div>
                </div>
            </Modal>

            <Modal
                open=Signal::derive(move || pending_delete.get().is_some())
                title="Delete configuration".to_string()
                on_close=Callback::new(move |_| {
                    if !deleting.get_untracked() {
                        pending_delete.set(None);
                    }
                })
            >
                <p class="text-sm text-muted-foreground">
                    "Delete "
                    <span class="font-mono text-foreground">{move || pending_delete.get().unwrap_or_default()}</span>
                    "? Apps reading this key fall back to their defaults."
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
