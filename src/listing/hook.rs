use super::debounce::{Debouncer, GlooScheduler, SEARCH_DEBOUNCE_MS};
use super::{fetch_records, Comparator, DateRange, ListRecord, ListSource, ListView, Liveness};
use crate::state::AppContext;
use crate::util::local_offset;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;

/// Reactive handles for one mounted list page.
pub(crate) struct ListHandle<R: Send + Sync + 'static> {
    pub view: RwSignal<ListView<R>>,
    /// Raw search box contents; applied to the view after the debounce window.
    pub search: RwSignal<String>,
    pub range: RwSignal<Option<DateRange>>,
}

impl<R: Send + Sync + 'static> Clone for ListHandle<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Send + Sync + 'static> Copy for ListHandle<R> {}

/// Fetches `source` once on mount and wires the search box (debounced) and the date range
/// (immediate) to the controller.
pub(crate) fn use_list_view<R>(source: ListSource, initial_order: Option<Comparator<R>>) -> ListHandle<R>
where
    R: ListRecord + DeserializeOwned + Send + Sync + 'static,
{
    let app = expect_context::<AppContext>();
    let store = app.0.store.clone();

    let view = RwSignal::new(ListView::<R>::new(local_offset()));
    let search = RwSignal::new(String::new());
    let range = RwSignal::new(None::<DateRange>);
    let alive = Liveness::new();

    {
        let alive = alive.clone();
        spawn_local(async move {
            let result = fetch_records::<R>(store.as_ref(), &source).await;
            if !alive.is_alive() {
                log::debug!("{} fetch finished after unmount, dropped", source.collection());
                return;
            }
            if let Err(e) = &result {
                log::error!("failed to load {}: {e}", source.collection());
            }
            view.try_update(|v| v.finish_load(result, initial_order));
        });
    }

    let debouncer = StoredValue::new_local(Debouncer::new(
        GlooScheduler,
        SEARCH_DEBOUNCE_MS,
        move |term: String| {
            view.try_update(|v| v.set_term(term));
        },
    ));

    Effect::new(move |prev: Option<()>| {
        let term = search.get();
        // The first run only subscribes; an empty box is already applied.
        if prev.is_some() {
            debouncer.with_value(|d| d.schedule(term));
        }
    });

    Effect::new(move |_| {
        let r = range.get();
        view.try_update(|v| v.set_range(r));
    });

    on_cleanup(move || {
        alive.kill();
        debouncer.try_with_value(|d| d.cancel());
    });

    ListHandle {
        view,
        search,
        range,
    }
}
