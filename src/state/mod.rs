use crate::session::{SessionGate, SessionState};
use crate::storage::{load_flag, save_flag, KeyValueStorage, SIDEBAR_COLLAPSED_KEY};
use crate::store::DocumentStore;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use std::sync::Arc;

pub(crate) const NOTICE_TTL_MS: u32 = 4_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

/// Transient toasts, newest last.
#[derive(Clone, Debug, Default)]
pub(crate) struct NoticeBoard {
    next_id: u64,
    items: Vec<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, kind: NoticeKind, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notice {
            id,
            kind,
            text: text.into(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub gate: Arc<SessionGate>,
    storage: Arc<dyn KeyValueStorage>,

    /// Mirrors the gate; written only by the gate's watch subscription.
    pub session: RwSignal<SessionState>,

    pub notices: RwSignal<NoticeBoard>,

    /// Global UI state.
    pub sidebar_collapsed: RwSignal<bool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gate: Arc<SessionGate>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        let sidebar_collapsed = load_flag(storage.as_ref(), SIDEBAR_COLLAPSED_KEY);
        let session = gate.state();

        Self {
            store,
            gate,
            storage,
            session: RwSignal::new(session),
            notices: RwSignal::new(NoticeBoard::default()),
            sidebar_collapsed: RwSignal::new(sidebar_collapsed),
        }
    }

    pub fn notify(&self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            NoticeKind::Error => log::error!("{text}"),
            NoticeKind::Warning => log::warn!("{text}"),
            NoticeKind::Success => log::info!("{text}"),
        }

        let Some(id) = self.notices.try_update(|b| b.push(kind, text)) else {
            return;
        };
        let notices = self.notices;
        Timeout::new(NOTICE_TTL_MS, move || {
            notices.try_update(|b| b.dismiss(id));
        })
        .forget();
    }

    pub fn toggle_sidebar(&self) {
        let collapsed = !self.sidebar_collapsed.get_untracked();
        self.sidebar_collapsed.set(collapsed);
        save_flag(self.storage.as_ref(), SIDEBAR_COLLAPSED_KEY, collapsed);
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_board_push_and_dismiss() {
        let mut board = NoticeBoard::default();
        let a = board.push(NoticeKind::Success, "Configuration added");
        let b = board.push(NoticeKind::Error, "Failed to delete user");
        assert_ne!(a, b);
        assert_eq!(board.items().len(), 2);

        board.dismiss(a);
        assert_eq!(board.items().len(), 1);
        assert_eq!(board.items()[0].text, "Failed to delete user");

        // unknown ids are ignored
        board.dismiss(a);
        assert_eq!(board.items().len(), 1);
    }
}
