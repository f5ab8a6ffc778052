use super::list::ListPage;
use crate::dashboard::WONDERS_SOURCE;
use crate::listing::hook::use_list_view;
use crate::listing::{compare_text, Cell, Column};
use crate::models::Wonder;
use crate::util::{display_value, truncate_chars};
use leptos::prelude::*;

pub(crate) const SUMMARY_PREVIEW_CHARS: usize = 50;

fn image(w: &Wonder) -> Cell {
    match w.links.images.first() {
        Some(src) if !src.is_empty() => Cell::Image {
            src: src.clone(),
            alt: w.name.clone(),
        },
        _ => Cell::Muted("No image".to_string()),
    }
}

fn summary(w: &Wonder) -> Cell {
    if w.summary.trim().is_empty() {
        Cell::Muted("N/A".to_string())
    } else {
        Cell::Text(truncate_chars(&w.summary, SUMMARY_PREVIEW_CHARS))
    }
}

fn links(w: &Wonder) -> Cell {
    let l = &w.links;
    let out: Vec<(&'static str, String)> = [
        ("Wikipedia", &l.wiki),
        ("Britannica", &l.britannica),
        ("Google Maps", &l.google_maps),
        ("Trip Advisor", &l.trip_advisor),
    ]
    .into_iter()
    .filter_map(|(label, href)| {
        href.as_ref()
            .filter(|h| !h.trim().is_empty())
            .map(|h| (label, h.clone()))
    })
    .collect();

    if out.is_empty() {
        Cell::Muted("N/A".to_string())
    } else {
        Cell::Links(out)
    }
}

pub(crate) fn wonder_columns() -> Vec<Column<Wonder>> {
    vec![
        Column::<Wonder> { title: "Image", cell: image, sort: None },
        Column::<Wonder> {
            title: "Name",
            cell: |w| Cell::Strong(w.name.clone()),
            sort: Some(|a, b| compare_text(&a.name, &b.name)),
        },
        Column::<Wonder> { title: "Location", cell: |w| Cell::text_or_na(&w.location), sort: None },
        Column::<Wonder> {
            title: "Build Year",
            cell: |w| Cell::text_or_na(&display_value(&w.build_year)),
            sort: None,
        },
        Column::<Wonder> { title: "Time Period", cell: |w| Cell::text_or_na(&w.time_period), sort: None },
        Column::<Wonder> { title: "Summary", cell: summary, sort: None },
        Column::<Wonder> { title: "Links", cell: links, sort: None },
    ]
}

#[component]
pub fn WondersPage() -> impl IntoView {
    let list = use_list_view::<Wonder>(WONDERS_SOURCE, None);

    view! {
        <ListPage
            title="Wonders"
            placeholder="Search by wonder name"
            list=list
            columns=wonder_columns()
        />
    }
}
