use crate::api::ApiResult;
use crate::listing::{decode_all, fetch_raw, ListRecord, ListSource};
use crate::models::Feedback;
use crate::store::{
    DocumentStore, COUNTRIES_COLLECTION, COUNTRIES_DOC, FEEDBACK_COLLECTION, FEEDBACK_DOC,
    USERS_COLLECTION, WONDERS_COLLECTION, WONDERS_DOC,
};
use std::cmp::Ordering;

pub(crate) const COUNTRIES_SOURCE: ListSource = ListSource::DocumentArray {
    collection: COUNTRIES_COLLECTION,
    document: COUNTRIES_DOC,
    field: "countries",
};

pub(crate) const WONDERS_SOURCE: ListSource = ListSource::DocumentArray {
    collection: WONDERS_COLLECTION,
    document: WONDERS_DOC,
    field: "wonders",
};

pub(crate) const FEEDBACK_SOURCE: ListSource = ListSource::DocumentArray {
    collection: FEEDBACK_COLLECTION,
    document: FEEDBACK_DOC,
    field: "feedBacks",
};

pub(crate) const USERS_SOURCE: ListSource = ListSource::Collection {
    collection: USERS_COLLECTION,
};

pub(crate) const RECENT_FEEDBACK_LIMIT: usize = 10;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DashboardSummary {
    pub countries: usize,
    pub wonders: usize,
    pub users: usize,
    /// Stored entries, including ones that do not decode.
    pub feedback_count: usize,
    pub feedback: Vec<Feedback>,
}

impl DashboardSummary {
    /// Newest first; entries without a timestamp keep their stored order at the end.
    pub fn recent_feedback(&self) -> Vec<Feedback> {
        let mut items = self.feedback.clone();
        items.sort_by(|a, b| match (a.created_at(), b.created_at()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        items.truncate(RECENT_FEEDBACK_LIMIT);
        items
    }
}

fn or_default<T: Default>(what: &str, result: ApiResult<T>) -> T {
    result.unwrap_or_else(|e| {
        log::error!("dashboard: failed to load {what}: {e}");
        T::default()
    })
}

/// Runs the four fetches concurrently. A failing source leaves its value at the default.
/// Counts are taken from the stored elements, so an entry that fails to decode still counts.
pub(crate) async fn load_dashboard(store: &dyn DocumentStore) -> DashboardSummary {
    let (countries, wonders, users, feedback) = futures::join!(
        fetch_raw(store, &COUNTRIES_SOURCE),
        fetch_raw(store, &WONDERS_SOURCE),
        fetch_raw(store, &USERS_SOURCE),
        fetch_raw(store, &FEEDBACK_SOURCE),
    );

    let feedback = or_default("feedback", feedback);
    DashboardSummary {
        countries: or_default("countries", countries).len(),
        wonders: or_default("wonders", wonders).len(),
        users: or_default("users", users).len(),
        feedback_count: feedback.len(),
        feedback: decode_all(feedback, FEEDBACK_COLLECTION),
    }
}
