//! Generic list-view controller shared by the countries, wonders, feedback and users pages.
//!
//! The controller owns two sets: the *authoritative* set as fetched, and the *displayed* set
//! derived from it through the current [`FilterState`]. Filtering never mutates the
//! authoritative set. Rendering-only concerns (sorting, paging) produce copies.

pub(crate) mod debounce;
pub(crate) mod hook;

use crate::api::{ApiError, ApiResult};
use crate::store::{DocumentStore, Record};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

pub(crate) const PAGE_SIZE: usize = 10;

pub(crate) trait ListRecord: Clone + 'static {
    /// Natural key, unique within the source.
    fn key(&self) -> String;

    /// The one field the search box matches against.
    fn search_field(&self) -> Option<&str>;

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListSource {
    /// An array stored in one field of one document.
    DocumentArray {
        collection: &'static str,
        document: &'static str,
        field: &'static str,
    },
    /// Every document of a collection; the document id is exposed as `id`.
    Collection { collection: &'static str },
}

impl ListSource {
    pub fn collection(&self) -> &'static str {
        match self {
            ListSource::DocumentArray { collection, .. } => collection,
            ListSource::Collection { collection } => collection,
        }
    }
}

pub(crate) fn decode_all<R: DeserializeOwned>(items: impl IntoIterator<Item = Value>, what: &str) -> Vec<R> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value::<R>(v) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("skipping unreadable {what} entry #{i}: {e}");
                None
            }
        })
        .collect()
}

/// Raw elements of the source, before decoding. A missing source document means "no data",
/// not an error.
pub(crate) async fn fetch_raw(store: &dyn DocumentStore, source: &ListSource) -> ApiResult<Vec<Value>> {
    match *source {
        ListSource::DocumentArray {
            collection,
            document,
            field,
        } => {
            let mut doc = match store.get_document(collection, document).await {
                Ok(doc) => doc,
                Err(e) if e.is_not_found() => {
                    log::info!("{collection}/{document} does not exist yet");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };
            match doc.remove(field) {
                Some(Value::Array(items)) => Ok(items),
                Some(other) => {
                    log::warn!("{collection}/{document}.{field} is not an array: {other}");
                    Ok(Vec::new())
                }
                None => Ok(Vec::new()),
            }
        }
        ListSource::Collection { collection } => {
            let docs = store.get_collection(collection).await?;
            Ok(docs
                .into_iter()
                .map(|snap| {
                    let mut fields: Record = snap.fields;
                    fields.insert("id".to_string(), Value::String(snap.id));
                    Value::Object(fields)
                })
                .collect())
        }
    }
}

pub(crate) async fn fetch_records<R: DeserializeOwned>(
    store: &dyn DocumentStore,
    source: &ListSource,
) -> ApiResult<Vec<R>> {
    let items = fetch_raw(store, source).await?;
    Ok(decode_all(items, source.collection()))
}

/// Only whole documents can be deleted; array elements are read-only here.
pub(crate) async fn delete_record(
    store: &dyn DocumentStore,
    source: &ListSource,
    key: &str,
) -> ApiResult<()> {
    match source {
        ListSource::Collection { collection } => store.delete_document(collection, key).await,
        ListSource::DocumentArray { collection, .. } => Err(ApiError::validation(format!(
            "records in {collection} cannot be deleted"
        ))),
    }
}

/// Inclusive calendar-day range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Day boundaries are taken in `offset` (the browser's local zone).
    pub fn contains(&self, at: &DateTime<Utc>, offset: FixedOffset) -> bool {
        let day = at.with_timezone(&offset).date_naive();
        self.start <= day && day <= self.end
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FilterState {
    pub term: String,
    pub range: Option<DateRange>,
}

pub(crate) fn matches_term<R: ListRecord>(record: &R, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_field()
        .map(|f| f.to_lowercase().contains(&needle))
        .unwrap_or(false)
}

pub(crate) fn matches_range<R: ListRecord>(
    record: &R,
    range: Option<&DateRange>,
    offset: FixedOffset,
) -> bool {
    match range {
        None => true,
        Some(r) => record
            .created_at()
            .map(|at| r.contains(&at, offset))
            .unwrap_or(false),
    }
}

pub(crate) fn apply_filter<R: ListRecord>(
    records: &[R],
    filter: &FilterState,
    offset: FixedOffset,
) -> Vec<R> {
    records
        .iter()
        .filter(|r| matches_term(*r, &filter.term) && matches_range(*r, filter.range.as_ref(), offset))
        .cloned()
        .collect()
}

pub(crate) type Comparator<R> = fn(&R, &R) -> Ordering;

#[derive(Clone, Debug)]
pub(crate) struct ListView<R> {
    authoritative: Vec<R>,
    displayed: Vec<R>,
    filter: FilterState,
    loading: bool,
    error: Option<String>,
    offset: FixedOffset,
}

impl<R: ListRecord> ListView<R> {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            authoritative: Vec::new(),
            displayed: Vec::new(),
            filter: FilterState::default(),
            loading: true,
            error: None,
            offset,
        }
    }

    pub fn displayed(&self) -> &[R] {
        &self.displayed
    }

    #[cfg(test)]
    pub fn authoritative(&self) -> &[R] {
        &self.authoritative
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Failure leaves both sets empty with an error message.
    pub fn finish_load(&mut self, result: ApiResult<Vec<R>>, initial_order: Option<Comparator<R>>) {
        self.loading = false;
        match result {
            Ok(mut records) => {
                if let Some(cmp) = initial_order {
                    records.sort_by(cmp);
                }
                self.authoritative = records;
                self.error = None;
            }
            Err(e) => {
                self.authoritative.clear();
                self.error = Some(e.message);
            }
        }
        self.recompute();
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.filter.term = term.into();
        self.recompute();
    }

    pub fn set_range(&mut self, range: Option<DateRange>) {
        self.filter.range = range;
        self.recompute();
    }

    /// Drops a record from both sets. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.authoritative.len();
        self.authoritative.retain(|r| r.key() != key);
        self.displayed.retain(|r| r.key() != key);
        before != self.authoritative.len()
    }

    fn recompute(&mut self) {
        self.displayed = apply_filter(&self.authoritative, &self.filter, self.offset);
    }
}

/// Liveness flag checked by async work before touching a view that may be gone.
#[derive(Clone, Debug)]
pub(crate) struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, AtomicOrdering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Cell {
    Text(String),
    Strong(String),
    Muted(String),
    Image { src: String, alt: String },
    Links(Vec<(&'static str, String)>),
}

impl Cell {
    /// Blank text renders as a muted `N/A`.
    pub fn text_or_na(s: &str) -> Cell {
        if s.trim().is_empty() {
            Cell::Muted("N/A".to_string())
        } else {
            Cell::Text(s.to_string())
        }
    }
}

pub(crate) struct Column<R> {
    pub title: &'static str,
    pub cell: fn(&R) -> Cell,
    pub sort: Option<Comparator<R>>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortState {
    /// Clicking a header: ascending, then descending, then unsorted.
    pub fn cycle(current: Option<SortState>, column: usize) -> Option<SortState> {
        match current {
            Some(s) if s.column == column => match s.direction {
                SortDirection::Ascending => Some(SortState {
                    column,
                    direction: SortDirection::Descending,
                }),
                SortDirection::Descending => None,
            },
            _ => Some(SortState {
                column,
                direction: SortDirection::Ascending,
            }),
        }
    }
}

pub(crate) fn sorted<R: Clone>(records: &[R], columns: &[Column<R>], sort: Option<SortState>) -> Vec<R> {
    let mut out = records.to_vec();
    let Some(state) = sort else {
        return out;
    };
    let Some(cmp) = columns.get(state.column).and_then(|c| c.sort) else {
        return out;
    };
    match state.direction {
        SortDirection::Ascending => out.sort_by(cmp),
        SortDirection::Descending => out.sort_by(|a, b| cmp(b, a)),
    }
    out
}

pub(crate) fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Missing timestamps sort before every real one.
pub(crate) fn compare_time(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    a.cmp(&b)
}

pub(crate) fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

/// Index range of page `page` (0-based), clamped to the last page.
pub(crate) fn page_range(len: usize, page: usize) -> Range<usize> {
    let page = page.min(page_count(len) - 1);
    let start = (page * PAGE_SIZE).min(len);
    let end = (start + PAGE_SIZE).min(len);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Clone, Debug, PartialEq)]
    struct Named {
        #[serde(default)]
        id: String,
        name: Option<String>,
        #[serde(default, rename = "createdAt")]
        created_at: Option<String>,
    }

    impl ListRecord for Named {
        fn key(&self) -> String {
            self.id.clone()
        }

        fn search_field(&self) -> Option<&str> {
            self.name.as_deref()
        }

        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.created_at
                .as_ref()
                .and_then(|s| crate::util::parse_timestamp(&json!(s)))
        }
    }

    fn named(id: &str, name: &str) -> Named {
        Named {
            id: id.to_string(),
            name: Some(name.to_string()),
            created_at: None,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn by_name(a: &Named, b: &Named) -> Ordering {
        compare_text(a.name.as_deref().unwrap_or(""), b.name.as_deref().unwrap_or(""))
    }

    fn name_cell(r: &Named) -> Cell {
        Cell::text_or_na(r.name.as_deref().unwrap_or_default())
    }

    fn loaded(records: Vec<Named>) -> ListView<Named> {
        let mut v = ListView::new(utc());
        v.finish_load(Ok(records), None);
        v
    }

    fn names(rs: &[Named]) -> Vec<String> {
        rs.iter().filter_map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_blank_term_shows_everything() {
        let mut v = loaded(vec![named("1", "India"), named("2", "France")]);
        assert_eq!(v.displayed(), v.authoritative());
        v.set_term("   ");
        assert_eq!(v.displayed(), v.authoritative());
    }

    #[test]
    fn test_term_is_case_insensitive_substring() {
        let mut v = loaded(vec![
            named("1", "India"),
            named("2", "Indonesia"),
            named("3", "France"),
        ]);
        v.set_term("ind");
        assert_eq!(names(v.displayed()), vec!["India", "Indonesia"]);
        v.set_term("IND");
        assert_eq!(names(v.displayed()), vec!["India", "Indonesia"]);
        // authoritative set untouched
        assert_eq!(v.authoritative().len(), 3);

        v.set_term("");
        assert_eq!(v.displayed().len(), 3);
    }

    #[test]
    fn test_missing_search_field_never_matches() {
        let mut v = loaded(vec![
            Named {
                id: "1".to_string(),
                name: None,
                created_at: None,
            },
            named("2", "Peru"),
        ]);
        v.set_term("p");
        assert_eq!(names(v.displayed()), vec!["Peru"]);
        v.set_term("");
        assert_eq!(v.displayed().len(), 2);
    }

    #[test]
    fn test_range_and_term_combine() {
        let rec = |id: &str, name: &str, at: &str| Named {
            id: id.to_string(),
            name: Some(name.to_string()),
            created_at: Some(at.to_string()),
        };
        let mut v = loaded(vec![
            rec("1", "abc-1", "2025-03-01T10:00:00Z"),
            rec("2", "abc-2", "2025-04-20T10:00:00Z"),
            rec("3", "xyz-3", "2025-03-02T10:00:00Z"),
            named("4", "abc-4"),
        ]);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        v.set_term("abc");
        v.set_range(Some(range));
        // #2 matches the term but falls outside the range; #4 has no timestamp
        assert_eq!(names(v.displayed()), vec!["abc-1"]);

        v.set_range(None);
        assert_eq!(v.displayed().len(), 3);
    }

    #[test]
    fn test_range_uses_local_day_boundaries() {
        let at = Utc.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap();
        let march = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        assert!(march.contains(&at, utc()));
        // 20:00 UTC is already April 1st in UTC+05:30
        let ist = FixedOffset::east_opt(19800).unwrap();
        assert!(!march.contains(&at, ist));
    }

    #[test]
    fn test_date_range_normalizes_order() {
        let a = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let r = DateRange::new(a, b);
        assert_eq!(r.start, b);
        assert_eq!(r.end, a);
    }

    #[test]
    fn test_failed_load_shows_error_and_empty_sets() {
        let mut v: ListView<Named> = ListView::new(utc());
        assert!(v.loading());
        v.finish_load(Err(ApiError::unauthorized()), None);
        assert!(!v.loading());
        assert_eq!(v.error(), Some("Unauthorized"));
        assert!(v.displayed().is_empty());
        assert!(v.authoritative().is_empty());
    }

    #[test]
    fn test_initial_order_applies_once() {
        let mut v = ListView::new(utc());
        v.finish_load(Ok(vec![named("1", "b"), named("2", "a")]), Some(by_name));
        assert_eq!(names(v.displayed()), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_drops_from_both_sets() {
        let mut v = loaded(vec![named("1", "India"), named("2", "France")]);
        v.set_term("fr");
        assert!(v.remove("2"));
        assert!(v.displayed().is_empty());
        assert_eq!(v.authoritative().len(), 1);
        assert!(!v.remove("missing"));
    }

    #[test]
    fn test_fetch_document_array_skips_bad_elements() {
        let store = MemoryStore::new().with_document(
            "countriesList",
            "allCountries",
            json!({"countries": [{"name": "India"}, 42, {"name": "France"}]}),
        );
        let source = ListSource::DocumentArray {
            collection: "countriesList",
            document: "allCountries",
            field: "countries",
        };
        let records: Vec<Named> = block_on(fetch_records(&store, &source)).unwrap();
        assert_eq!(names(&records), vec!["India", "France"]);
    }

    #[test]
    fn test_fetch_keeps_elements_with_null_fields() {
        let store = MemoryStore::new().with_document(
            "countriesList",
            "allCountries",
            json!({"countries": [
                {"name": "India", "capital": "New Delhi"},
                {"name": "Antarctica", "capital": null, "population": null}
            ]}),
        );
        let source = ListSource::DocumentArray {
            collection: "countriesList",
            document: "allCountries",
            field: "countries",
        };
        let records: Vec<crate::models::Country> = block_on(fetch_records(&store, &source)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Antarctica");
        assert_eq!(records[1].capital, "");
    }

    #[test]
    fn test_fetch_missing_document_is_empty_not_error() {
        let store = MemoryStore::new();
        let source = ListSource::DocumentArray {
            collection: "feedback",
            document: "userFeedback",
            field: "feedBacks",
        };
        let records: Vec<Named> = block_on(fetch_records(&store, &source)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let store = MemoryStore::new();
        store.fail_collection("users");
        let source = ListSource::Collection { collection: "users" };
        let err = block_on(fetch_records::<Named>(&store, &source)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
    }

    #[test]
    fn test_fetch_collection_exposes_document_id() {
        let store = MemoryStore::new()
            .with_document("users", "doc-1", json!({"name": "a", "id": "stale"}))
            .with_document("users", "doc-2", json!({"name": "b"}));
        let source = ListSource::Collection { collection: "users" };
        let records: Vec<Named> = block_on(fetch_records(&store, &source)).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "doc-2"]);
    }

    #[test]
    fn test_delete_then_remove_keeps_state_on_failure() {
        let store = MemoryStore::new()
            .with_document("users", "doc-1", json!({"name": "a"}))
            .with_document("users", "doc-2", json!({"name": "b"}));
        let source = ListSource::Collection { collection: "users" };
        let mut v = loaded(block_on(fetch_records(&store, &source)).unwrap());

        store.fail_collection("users");
        assert!(block_on(delete_record(&store, &source, "doc-1")).is_err());
        assert_eq!(v.authoritative().len(), 2);

        store.heal_collection("users");
        block_on(delete_record(&store, &source, "doc-1")).unwrap();
        v.remove("doc-1");
        assert_eq!(v.authoritative().len(), 1);
        assert!(store.document("users", "doc-1").is_none());
    }

    #[test]
    fn test_delete_from_document_array_is_rejected() {
        let store = MemoryStore::new();
        let source = ListSource::DocumentArray {
            collection: "wondersList",
            document: "allWonders",
            field: "wonders",
        };
        let err = block_on(delete_record(&store, &source, "x")).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
    }

    #[test]
    fn test_sort_cycle_and_copy() {
        let columns = [Column::<Named> {
            title: "Name",
            cell: name_cell,
            sort: Some(by_name),
        }];
        let rows = vec![named("1", "beta"), named("2", "Alpha"), named("3", "gamma")];

        let asc = SortState::cycle(None, 0);
        assert_eq!(names(&sorted(&rows, &columns, asc)), vec!["Alpha", "beta", "gamma"]);
        let desc = SortState::cycle(asc, 0);
        assert_eq!(names(&sorted(&rows, &columns, desc)), vec!["gamma", "beta", "Alpha"]);
        assert_eq!(SortState::cycle(desc, 0), None);
        // input order untouched
        assert_eq!(names(&rows), vec!["beta", "Alpha", "gamma"]);
    }

    #[test]
    fn test_compare_time_missing_first() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(compare_time(None, Some(t)), Ordering::Less);
        assert_eq!(compare_time(Some(t), Some(t)), Ordering::Equal);
    }

    #[test]
    fn test_pagination() {
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(11), 2);
        assert_eq!(page_range(25, 0), 0..10);
        assert_eq!(page_range(25, 2), 20..25);
        assert_eq!(page_range(25, 9), 20..25);
        assert_eq!(page_range(0, 0), 0..0);
    }

    #[test]
    fn test_liveness() {
        let alive = Liveness::new();
        let seen_by_task = alive.clone();
        assert!(seen_by_task.is_alive());
        alive.kill();
        assert!(!seen_by_task.is_alive());
    }
}
