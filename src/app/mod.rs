use crate::api::firestore::FirestoreClient;
use crate::api::identity::FirebaseAuth;
use crate::api::EnvConfig;
use crate::components::ui::PageSpinner;
use crate::pages::{page_for, AppLayout, LoginPage};
use crate::routes::{resolve, AppRoute, RouteDecision};
use crate::session::{IdentityProvider, SessionGate, SessionState};
use crate::state::{AppContext, AppState};
use crate::storage::{BrowserStorage, KeyValueStorage};
use crate::store::DocumentStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::hooks::use_location;
use leptos_router::path;
use std::sync::Arc;

/// Picks spinner, redirect, login or the signed-in shell for the current path.
#[component]
fn Gate() -> impl IntoView {
    let session = expect_context::<AppContext>().0.session;
    let location = use_location();

    move || match resolve(&location.pathname.get(), session.get()) {
        RouteDecision::Loading => view! { <PageSpinner label="Checking session..." /> }.into_any(),
        RouteDecision::Redirect(to) => view! { <Redirect path=to.path() /> }.into_any(),
        RouteDecision::Render(AppRoute::Login) => view! { <LoginPage /> }.into_any(),
        RouteDecision::Render(route) => view! {
            <AppLayout>
                {move || page_for(route)}
            </AppLayout>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = EnvConfig::from_window();
    let storage: Arc<dyn KeyValueStorage> = Arc::new(BrowserStorage);
    let auth: Arc<dyn IdentityProvider> = Arc::new(FirebaseAuth::new(config.clone(), storage.clone()));
    let store: Arc<dyn DocumentStore> = Arc::new(FirestoreClient::new(&config, auth.clone()));
    let gate = Arc::new(SessionGate::new(auth, storage.clone()));

    let state = AppState::new(store, gate.clone(), storage);
    let session = state.session;

    // The signal only mirrors the gate; nothing else writes it.
    let subscription = gate.watch(Arc::new(move |s: &SessionState| {
        session.try_set(*s);
    }));
    let _subscription = StoredValue::new(subscription);

    provide_context(AppContext(state));

    spawn_local(async move {
        gate.start().await;
    });

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <Gate /> }>
                <Route path=path!("login") view=Gate />
                <Route path=path!("countries") view=Gate />
                <Route path=path!("wonders") view=Gate />
                <Route path=path!("users") view=Gate />
                <Route path=path!("feedback") view=Gate />
                <Route path=path!("settings") view=Gate />
                <Route path=path!("") view=Gate />
            </Routes>
        </Router>
    }
}
