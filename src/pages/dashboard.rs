use super::list::PageHeader;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, Spinner, StatCard,
    Table, TableBody, TableCell, TableHead, TableHeader, TableRow, TableWrapper,
};
use crate::dashboard::{load_dashboard, DashboardSummary};
use crate::listing::{Liveness, ListRecord};
use crate::models::{DeviceInfo, Feedback};
use crate::routes::AppRoute;
use crate::state::AppContext;
use crate::util::{format_ist, truncate_chars};
use leptos::prelude::*;
use leptos::task::spawn_local;

const FEEDBACK_PREVIEW_CHARS: usize = 60;

fn or_unknown(v: &Option<String>) -> String {
    match v.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "Unknown".to_string(),
    }
}

pub(crate) fn os_label(device: &DeviceInfo) -> String {
    match (device.os_name.as_deref(), device.os_version.as_deref()) {
        (Some(name), Some(version)) if !version.trim().is_empty() => format!("{name} {version}"),
        (Some(name), _) => name.to_string(),
        _ => "Unknown".to_string(),
    }
}

pub(crate) fn feedback_preview(f: &Feedback) -> String {
    match f.feedback_content.as_deref() {
        Some(text) if !text.trim().is_empty() => truncate_chars(text, FEEDBACK_PREVIEW_CHARS),
        _ => "N/A".to_string(),
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let summary: RwSignal<DashboardSummary> = RwSignal::new(DashboardSummary::default());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let alive = Liveness::new();

    {
        let store = app_state.0.store.clone();
        let alive = alive.clone();
        spawn_local(async move {
            let loaded = load_dashboard(store.as_ref()).await;
            if alive.is_alive() {
                summary.try_set(loaded);
                loading.try_set(false);
            }
        });
    }
    on_cleanup(move || alive.kill());

    let on_logout = {
        let app_state = app_state.clone();
        move |_| {
            let gate = app_state.0.gate.clone();
            spawn_local(async move {
                gate.sign_out().await;
            });
        }
    };

    let recent_rows = move || {
        if loading.get() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=5 class="py-10">
                        <div class="flex justify-center"><Spinner class="size-6" /></div>
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        let recent = summary.with(|s| s.recent_feedback());
        if recent.is_empty() {
            return view! {
                <TableRow>
                    <TableCell attr:colspan=5 class="py-10 text-center text-muted-foreground">
                        "No feedback yet"
                    </TableCell>
                </TableRow>
            }
            .into_any();
        }

        recent
            .into_iter()
            .map(|f| {
                let device = f.device();
                let when = f
                    .created_at()
                    .map(|at| format_ist(&at))
                    .unwrap_or_else(|| "N/A".to_string());
                let device_name = or_unknown(&device.device_name);
                let brand = or_unknown(&device.brand);
                let os = os_label(&device);
                let preview = feedback_preview(&f);
                view! {
                    <TableRow>
                        <TableCell>{device_name}</TableCell>
                        <TableCell>{brand}</TableCell>
                        <TableCell>{os}</TableCell>
                        <TableCell class="max-w-md">{preview}</TableCell>
                        <TableCell class="whitespace-nowrap text-muted-foreground">{when}</TableCell>
                    </TableRow>
                }
            })
            .collect_view()
            .into_any()
    };

    let count = move |pick: fn(&DashboardSummary) -> usize| Signal::derive(move || summary.with(pick));

    view! {
        <div class="space-y-6">
            <PageHeader title="WorldInfo Admin Dashboard">
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                    "Sign out"
                </Button>
            </PageHeader>

            <div class="grid grid-cols-1 gap-4 sm:grid-cols-2 xl:grid-cols-4">
                <StatCard
                    title="Total Countries"
                    href=AppRoute::Countries.path()
                    count=count(|s| s.countries)
                    class="bg-sky-50"
                />
                <StatCard
                    title="Total Wonders"
                    href=AppRoute::Wonders.path()
                    count=count(|s| s.wonders)
                    class="bg-amber-50"
                />
                <StatCard
                    title="Total Feedbacks"
                    href=AppRoute::Feedback.path()
                    count=count(|s| s.feedback_count)
                    class="bg-emerald-50"
                />
                <StatCard
                    title="Total Users"
                    href=AppRoute::Users.path()
                    count=count(|s| s.users)
                    class="bg-violet-50"
                />
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Recent feedback"</CardTitle>
                </CardHeader>
                <CardContent>
                    <TableWrapper>
                        <Table>
                            <TableHeader>
                                <TableRow>
                                    <TableHead>"Device"</TableHead>
                                    <TableHead>"Brand"</TableHead>
                                    <TableHead>"OS"</TableHead>
                                    <TableHead>"Feedback"</TableHead>
                                    <TableHead>"Date"</TableHead>
                                </TableRow>
                            </TableHeader>
                            <TableBody>{recent_rows}</TableBody>
                        </Table>
                    </TableWrapper>
                </CardContent>
            </Card>
        </div>
    }
}
