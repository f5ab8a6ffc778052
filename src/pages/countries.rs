use super::list::ListPage;
use crate::dashboard::COUNTRIES_SOURCE;
use crate::listing::hook::use_list_view;
use crate::listing::{compare_text, Cell, Column};
use crate::models::Country;
use crate::util::group_thousands;
use leptos::prelude::*;

fn flag(c: &Country) -> Cell {
    if c.flags.png.is_empty() {
        Cell::Muted("N/A".to_string())
    } else {
        Cell::Image {
            src: c.flags.png.clone(),
            alt: format!("Flag of {}", c.name),
        }
    }
}

fn currencies(c: &Country) -> Cell {
    let text = c
        .currencies
        .iter()
        .map(|cur| {
            if cur.symbol.is_empty() {
                cur.name.clone()
            } else {
                format!("{} ({})", cur.name, cur.symbol)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    Cell::text_or_na(&text)
}

fn languages(c: &Country) -> Cell {
    let text = c
        .languages
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Cell::text_or_na(&text)
}

pub(crate) fn country_columns() -> Vec<Column<Country>> {
    vec![
        Column::<Country> { title: "Flag", cell: flag, sort: None },
        Column::<Country> {
            title: "Name",
            cell: |c| Cell::Strong(c.name.clone()),
            sort: Some(|a, b| compare_text(&a.name, &b.name)),
        },
        Column::<Country> { title: "Region", cell: |c| Cell::text_or_na(&c.region), sort: None },
        Column::<Country> { title: "Capital", cell: |c| Cell::text_or_na(&c.capital), sort: None },
        Column::<Country> {
            title: "Population",
            cell: |c| Cell::Text(group_thousands(c.population.max(0.0).round() as u64)),
            sort: Some(|a, b| a.population.total_cmp(&b.population)),
        },
        Column::<Country> { title: "Currencies", cell: currencies, sort: None },
        Column::<Country> { title: "Languages", cell: languages, sort: None },
    ]
}

#[component]
pub fn CountriesPage() -> impl IntoView {
    let list = use_list_view::<Country>(COUNTRIES_SOURCE, None);

    view! {
        <ListPage
            title="Countries"
            placeholder="Search by country name"
            list=list
            columns=country_columns()
        />
    }
}
