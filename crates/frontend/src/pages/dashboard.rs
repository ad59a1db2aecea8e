use dioxus::prelude::*;
use forecast360_shared::panel::ForecastTicket;
use forecast360_shared::registry::{self, TopicId};
use forecast360_shared::{Dashboard, DashboardConfig, SubmitError};

use crate::api;
use crate::components::forecast_panel::ForecastPanel;
use crate::components::map_view::MapView;
use crate::effects::use_viewport_runner;

/// Send `ticket` and hand the outcome back to the dashboard. The response is
/// dropped there if the panel has moved on in the meantime.
fn dispatch(mut dashboard: Signal<Dashboard>, ticket: ForecastTicket) {
    let base = dashboard.peek().config().api_base_url.clone();
    spawn(async move {
        let outcome = api::predict(&base, &ticket.request).await;
        if let Err(e) = &outcome {
            tracing::warn!(panel = ticket.panel.0, seq = ticket.seq, error = %e, "forecast request failed");
        }
        let disposition = dashboard.write().apply_forecast(&ticket, outcome);
        tracing::debug!(panel = ticket.panel.0, seq = ticket.seq, ?disposition, "forecast response handled");
    });
}

fn log_submit_error(e: &SubmitError) {
    match e {
        SubmitError::NoSelection => tracing::warn!("submit without an open panel"),
        SubmitError::Validation(v) => tracing::debug!(error = %v, "forecast not sent"),
    }
}

#[component]
pub fn DashboardPage(initial_topic: Option<TopicId>) -> Element {
    let setup = use_resource(|| async {
        let config = match api::fetch_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using built-in dashboard configuration");
                DashboardConfig::default()
            }
        };
        Dashboard::new(config)
    });

    let view = match &*setup.read() {
        None => rsx! {
            div { class: "loading", "Loading FijiForecast360…" }
        },
        Some(Err(e)) => {
            tracing::error!(error = %e, "dashboard configuration rejected");
            rsx! {
                div { class: "fatal", "Invalid dashboard configuration: {e}" }
            }
        }
        Some(Ok(dashboard)) => rsx! {
            DashboardView { initial: dashboard.clone(), initial_topic }
        },
    };
    view
}

#[component]
fn DashboardView(initial: Dashboard, initial_topic: Option<TopicId>) -> Element {
    let mut dashboard = use_signal(|| initial.clone());
    let runner = use_viewport_runner(dashboard);

    // Deep link: open the requested topic once the map exists.
    use_hook(move || {
        if let Some(id) = initial_topic {
            let effects = dashboard.write().select_marker(id);
            runner.run(effects);
        }
    });

    let selected = dashboard.read().selected_topic().map(|t| t.id);

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "FijiForecast360" }
                nav { class: "topic-list",
                    for topic in registry::topics() {
                        button {
                            key: "{topic.id}",
                            class: if selected == Some(topic.id) { "active" } else { "" },
                            onclick: {
                                let id = topic.id;
                                move |_| {
                                    let effects = dashboard.write().select_marker(id);
                                    runner.run(effects);
                                }
                            },
                            "{topic.icon} {topic.title}"
                        }
                    }
                }
            }

            MapView {
                runner,
                selected,
                on_select: move |id: TopicId| {
                    let effects = dashboard.write().select_marker(id);
                    runner.run(effects);
                },
            }

            if selected.is_some() {
                ForecastPanel {
                    dashboard,
                    on_submit: move |_| {
                        let today = chrono::Local::now().date_naive();
                        let submitted = dashboard.write().submit_forecast(today);
                        match submitted {
                            Ok(ticket) => dispatch(dashboard, ticket),
                            Err(e) => log_submit_error(&e),
                        }
                    },
                    on_retry: move |_| {
                        let today = chrono::Local::now().date_naive();
                        let submitted = dashboard.write().retry_forecast(today);
                        match submitted {
                            Ok(ticket) => dispatch(dashboard, ticket),
                            Err(e) => log_submit_error(&e),
                        }
                    },
                    on_close: move |_| {
                        let effects = dashboard.write().clear_selection();
                        runner.run(effects);
                    },
                }
            }
        }
    }
}
