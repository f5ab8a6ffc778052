use super::list::ListPage;
use crate::dashboard::FEEDBACK_SOURCE;
use crate::listing::hook::use_list_view;
use crate::listing::{compare_time, Cell, Column, ListRecord};
use crate::models::Feedback;
use crate::util::{format_ist, truncate_chars};
use leptos::prelude::*;

fn short_uuid(f: &Feedback) -> Cell {
    if f.uuid.is_empty() {
        Cell::Muted("-".to_string())
    } else {
        Cell::Text(truncate_chars(&f.uuid, 8))
    }
}

fn created(f: &Feedback) -> Cell {
    match f.created_at() {
        Some(at) => Cell::Text(format_ist(&at)),
        None => Cell::Muted("N/A".to_string()),
    }
}

pub(crate) fn feedback_columns() -> Vec<Column<Feedback>> {
    vec![
        Column::<Feedback> { title: "UUID", cell: short_uuid, sort: None },
        Column::<Feedback> {
            title: "Feedback",
            cell: |f| Cell::text_or_na(f.feedback_content.as_deref().unwrap_or_default()),
            sort: None,
        },
        Column::<Feedback> {
            title: "Created At",
            cell: created,
            sort: Some(|a, b| compare_time(a.created_at(), b.created_at())),
        },
        Column::<Feedback> {
            title: "OS",
            cell: |f| Cell::text_or_na(f.device().os_name.as_deref().unwrap_or_default()),
            sort: None,
        },
        Column::<Feedback> {
            title: "Device",
            cell: |f| Cell::text_or_na(f.device().device_name.as_deref().unwrap_or_default()),
            sort: None,
        },
    ]
}

#[component]
pub fn FeedbackPage() -> impl IntoView {
    let list = use_list_view::<Feedback>(FEEDBACK_SOURCE, None);

    view! {
        <ListPage
            title="Feedback"
            placeholder="Search feedback text"
            list=list
            columns=feedback_columns()
        />
    }
}
