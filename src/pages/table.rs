use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Spinner, Table, TableBody, TableCell, TableHead,
    TableHeader, TableRow, TableWrapper,
};
use crate::listing::{page_count, page_range, sorted, Cell, Column, ListRecord, SortDirection, SortState};
use leptos::prelude::*;

pub(crate) fn render_cell(cell: Cell) -> AnyView {
    match cell {
        Cell::Text(s) => view! { <span>{s}</span> }.into_any(),
        Cell::Strong(s) => view! { <span class="font-semibold">{s}</span> }.into_any(),
        Cell::Muted(s) => view! { <span class="text-muted-foreground">{s}</span> }.into_any(),
        Cell::Image { src, alt } => view! {
            <img src=src alt=alt loading="lazy" class="h-10 w-16 rounded border object-cover" />
        }
        .into_any(),
        Cell::Links(links) => view! {
            <div class="flex flex-col gap-0.5">
                {links
                    .into_iter()
                    .map(|(label, href)| {
                        view! {
                            <a
                                href=href
                                target="_blank"
                                rel="noopener noreferrer"
                                class="text-primary underline-offset-4 hover:underline"
                            >
                                {label}
                            </a>
                        }
                    })
                    .collect_view()}
            </div>
        }
        .into_any(),
    }
}

fn sort_marker(sort: Option<SortState>, column: usize) -> &'static str {
    match sort {
        Some(s) if s.column == column => match s.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        },
        _ => "↕",
    }
}

/// Client-side sorted, paginated table over the controller's displayed set.
#[component]
pub fn DataTable<R>(
    #[prop(into)] rows: Signal<Vec<R>>,
    columns: Vec<Column<R>>,
    #[prop(into)] loading: Signal<bool>,
    #[prop(optional)] on_view: Option<Callback<R>>,
    #[prop(optional)] on_delete: Option<Callback<R>>,
) -> impl IntoView
where
    R: ListRecord + Send + Sync + 'static,
{
    let sort: RwSignal<Option<SortState>> = RwSignal::new(None);
    let page: RwSignal<usize> = RwSignal::new(0);
    let has_actions = on_view.is_some() || on_delete.is_some();
    let span = columns.len() + usize::from(has_actions);
    let columns = StoredValue::new(columns);

    // A new filter result starts from the first page.
    Effect::new(move |_| {
        rows.track();
        page.set(0);
    });

    let total = move || rows.with(|r| r.len());

    let header = move || {
        columns.with_value(|cols| {
            cols.iter()
                .enumerate()
                .map(|(i, c)| {
                    let title = c.title;
                    if c.sort.is_some() {
                        view! {
                            <TableHead>
                                <button
                                    class="inline-flex items-center gap-1 hover:text-foreground"
                                    on:click=move |_| sort.update(|s| *s = SortState::cycle(*s, i))
                                >
                                    {title}
                                    <span class="text-[10px]">{move || sort_marker(sort.get(), i)}</span>
                                </button>
                            </TableHead>
                        }
                        .into_any()
                    } else {
                        view! { <TableHead>{title}</TableHead> }.into_any()
                    }
                })
                .collect_view()
        })
    };

    let body = move || {
        if loading.get() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=span class="py-10">
                        <div class="flex justify-center"><Spinner class="size-6" /></div>
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        let ordered = columns.with_value(|cols| sorted(&rows.get(), cols, sort.get()));
        if ordered.is_empty() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=span class="py-10 text-center text-muted-foreground">
                        "No data"
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        let range = page_range(ordered.len(), page.get());
        ordered[range]
            .iter()
            .map(|row| {
                let cells = columns.with_value(|cols| {
                    cols.iter()
                        .map(|c| {
                            let cell = render_cell((c.cell)(row));
                            view! { <TableCell>{cell}</TableCell> }
                        })
                        .collect_view()
                });
                let actions = has_actions.then(|| {
                    let view_btn = on_view.map(|cb| {
                        let r = row.clone();
                        view! {
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| cb.run(r.clone())>
                                "View"
                            </Button>
                        }
                    });
                    let delete_btn = on_delete.map(|cb| {
                        let r = row.clone();
                        view! {
                            <Button variant=ButtonVariant::Destructive size=ButtonSize::Sm on:click=move |_| cb.run(r.clone())>
                                "Delete"
                            </Button>
                        }
                    });
                    view! {
                        <TableCell>
                            <div class="flex gap-2">{view_btn}{delete_btn}</div>
                        </TableCell>
                    }
                });
                view! { <TableRow>{cells}{actions}</TableRow> }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div class="space-y-3">
            <TableWrapper>
                <Table>
                    <TableHeader>
                        <TableRow>
                            {header}
                            {has_actions.then(|| view! { <TableHead>"Actions"</TableHead> })}
                        </TableRow>
                    </TableHeader>
                    <TableBody>{body}</TableBody>
                </Table>
            </TableWrapper>

            <div class="flex items-center justify-between px-1 text-xs text-muted-foreground">
                <span>{move || format!("Total {} items", total())}</span>
                <div class="flex items-center gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || page.get() == 0
                        on:click=move |_| page.update(|p| *p = p.saturating_sub(1))
                    >
                        "Previous"
                    </Button>
                    <span>{move || format!("Page {} of {}", page.get() + 1, page_count(total()))}</span>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || page.get() + 1 >= page_count(total())
                        on:click=move |_| page.update(|p| *p += 1)
                    >
                        "Next"
                    </Button>
                </div>
            </div>
        </div>
    }
}
