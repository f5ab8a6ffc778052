use crate::session::SessionState;
use strum::{EnumIter, IntoEnumIterator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub(crate) enum AppRoute {
    Login,
    Dashboard,
    Countries,
    Wonders,
    Users,
    Feedback,
    Settings,
}

impl AppRoute {
    pub fn path(self) -> &'static str {
        match self {
            AppRoute::Login => "/login",
            AppRoute::Dashboard => "/",
            AppRoute::Countries => "/countries",
            AppRoute::Wonders => "/wonders",
            AppRoute::Users => "/users",
            AppRoute::Feedback => "/feedback",
            AppRoute::Settings => "/settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppRoute::Login => "Login",
            AppRoute::Dashboard => "Dashboard",
            AppRoute::Countries => "Countries",
            AppRoute::Wonders => "Wonders",
            AppRoute::Users => "Users",
            AppRoute::Feedback => "Feedback",
            AppRoute::Settings => "Settings",
        }
    }

    pub fn requires_auth(self) -> bool {
        self != AppRoute::Login
    }

    /// Trailing slashes are ignored; unknown paths give `None`.
    pub fn from_path(path: &str) -> Option<AppRoute> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        AppRoute::iter().find(|r| r.path() == normalized)
    }

    /// Sidebar entries, in display order.
    pub fn menu() -> impl Iterator<Item = AppRoute> {
        AppRoute::iter().filter(|r| r.requires_auth())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RouteDecision {
    /// Session not known yet: blocking spinner, no routing.
    Loading,
    Render(AppRoute),
    Redirect(AppRoute),
}

pub(crate) fn home_for(state: SessionState) -> AppRoute {
    if state == SessionState::Authenticated {
        AppRoute::Dashboard
    } else {
        AppRoute::Login
    }
}

pub(crate) fn resolve(path: &str, state: SessionState) -> RouteDecision {
    if state == SessionState::Unknown {
        return RouteDecision::Loading;
    }
    let authed = state == SessionState::Authenticated;

    match AppRoute::from_path(path) {
        Some(AppRoute::Login) if !authed => RouteDecision::Render(AppRoute::Login),
        Some(route) if route.requires_auth() && authed => RouteDecision::Render(route),
        _ => RouteDecision::Redirect(home_for(state)),
    }
}
