mod countries;
mod dashboard;
mod feedback;
mod layout;
mod list;
mod login;
mod settings;
mod table;
mod users;
mod wonders;

pub use countries::CountriesPage;
pub use dashboard::DashboardPage;
pub use feedback::FeedbackPage;
pub use layout::AppLayout;
pub use login::LoginPage;
pub use settings::SettingsPage;
pub use users::UsersPage;
pub use wonders::WondersPage;

use crate::routes::AppRoute;
use leptos::prelude::*;

/// Body for an authenticated route; the login route has no body of its own.
pub(crate) fn page_for(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Countries => view! { <CountriesPage /> }.into_any(),
        AppRoute::Wonders => view! { <WondersPage /> }.into_any(),
        AppRoute::Users => view! { <UsersPage /> }.into_any(),
        AppRoute::Feedback => view! { <FeedbackPage /> }.into_any(),
        AppRoute::Settings => view! { <SettingsPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
    }
}
