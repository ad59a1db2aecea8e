use std::str::FromStr;

use dioxus::prelude::*;
use forecast360_shared::calendar::{self, TimeOfDay, MONTH_NAMES};
use forecast360_shared::registry::ReferenceSeries;
use forecast360_shared::schema::{ForecastParams, TemperatureParams, TEMPERATURE_MAX, TEMPERATURE_MIN};
use forecast360_shared::{Dashboard, ForecastStatus};

/// Parse a `<select>`/`<input>` value; the empty placeholder option is `None`.
fn parse_choice<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// Bar lengths in percent of the largest point (all zero if none is positive).
fn bar_widths(points: &[(&str, f64)]) -> Vec<f64> {
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    points
        .iter()
        .map(|(_, v)| if max > 0.0 { (v / max * 100.0).max(0.0) } else { 0.0 })
        .collect()
}

fn update_params(mut dashboard: Signal<Dashboard>, f: impl FnOnce(&mut ForecastParams)) {
    if let Some(panel) = dashboard.write().panel_mut() {
        f(panel.params_mut());
    }
}

fn update_temperature(dashboard: Signal<Dashboard>, f: impl FnOnce(&mut TemperatureParams)) {
    update_params(dashboard, |params| {
        if let ForecastParams::Temperature(p) = params {
            f(p);
        }
    });
}

// ---------------------------------------------------------------------------
// Form fields
// ---------------------------------------------------------------------------

fn year_field(dashboard: Signal<Dashboard>, years: &[i32], year: Option<i32>) -> Element {
    rsx! {
        label { "Year"
            select {
                onchange: move |evt: Event<FormData>| {
                    let value = evt.value();
                    update_params(dashboard, |p| p.set_year(parse_choice(&value)));
                },
                option { value: "", selected: year.is_none(), "Select year" }
                for y in years.iter().copied() {
                    option { value: "{y}", selected: year == Some(y), "{y}" }
                }
            }
        }
    }
}

fn temperature_fields(dashboard: Signal<Dashboard>, params: &TemperatureParams) -> Element {
    let month = params.month;
    let day = params.day;
    let time = params.time;
    let days: Vec<u32> = params.day_choices().collect();
    let months: Vec<(u32, &str)> = (1..).zip(MONTH_NAMES.iter().copied()).collect();
    let slots: Vec<(TimeOfDay, u32)> = TimeOfDay::SLOTS.iter().map(|t| (*t, t.hour())).collect();

    rsx! {
        label { "Month"
            select {
                onchange: move |evt: Event<FormData>| {
                    let value = evt.value();
                    update_temperature(dashboard, |p| p.set_month(parse_choice(&value)));
                },
                option { value: "", selected: month.is_none(), "Select month" }
                for (m, name) in months {
                    option { value: "{m}", selected: month == Some(m), "{name}" }
                }
            }
        }
        label { "Day"
            select {
                disabled: days.is_empty(),
                onchange: move |evt: Event<FormData>| {
                    let value = evt.value();
                    update_temperature(dashboard, |p| p.day = parse_choice(&value));
                },
                option { value: "", selected: day.is_none(), "Select day" }
                for d in days.iter().copied() {
                    option { value: "{d}", selected: day == Some(d), "{d}" }
                }
            }
        }
        label { "Time"
            select {
                onchange: move |evt: Event<FormData>| {
                    let value = evt.value();
                    update_temperature(dashboard, |p| p.time = parse_choice::<TimeOfDay>(&value));
                },
                option { value: "", selected: time.is_none(), "Select time" }
                for (slot, hour) in slots {
                    option { value: "{hour}", selected: time == Some(slot), "{slot}" }
                }
            }
        }
    }
}

fn environment_field(dashboard: Signal<Dashboard>, temperature: String) -> Element {
    rsx! {
        label { "Temperature (°C)"
            input {
                r#type: "number",
                step: "0.1",
                min: "{TEMPERATURE_MIN}",
                max: "{TEMPERATURE_MAX}",
                value: "{temperature}",
                oninput: move |evt: Event<FormData>| {
                    let value = evt.value();
                    update_params(dashboard, |params| {
                        if let ForecastParams::Environment(p) = params {
                            p.temperature = value;
                        }
                    });
                },
            }
        }
    }
}

fn reference_chart(series: ReferenceSeries) -> Element {
    let widths = bar_widths(series.points);
    let rows: Vec<(&str, String, String)> = series
        .points
        .iter()
        .zip(widths)
        .map(|((label, value), width)| (*label, format!("width:{:.1}%;", width), value.to_string()))
        .collect();

    rsx! {
        div { class: "reference",
            h4 { "{series.label}" }
            for (label, bar_style, value) in rows {
                div { class: "bar-row",
                    span { class: "bar-label", "{label}" }
                    div { class: "bar-track",
                        div { class: "bar", style: "{bar_style}" }
                    }
                    span { class: "bar-value", "{value}" }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn ForecastPanel(
    dashboard: Signal<Dashboard>,
    on_submit: EventHandler<()>,
    on_retry: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let (topic, panel) = {
        let state = dashboard.read();
        match (state.selected_topic(), state.panel()) {
            (Some(topic), Some(panel)) => (topic, panel.clone()),
            _ => return rsx! {},
        }
    };

    let today = chrono::Local::now().date_naive();
    let years: Vec<i32> = calendar::forecast_years(today).collect();
    let status = panel.status();
    let heading = panel.kind().label();
    let fields = match panel.params() {
        ForecastParams::Temperature(p) => temperature_fields(dashboard, p),
        ForecastParams::Environment(p) => environment_field(dashboard, p.temperature.clone()),
        ForecastParams::Mortality(_) | ForecastParams::Economy(_) => rsx! {},
    };

    let validation = panel.validation_error().map(|e| e.to_string());
    let failure = panel.failure().map(|e| e.to_string());
    let stale = panel.is_stale();
    let selected_key = panel.selected_key().unwrap_or_default().to_string();
    let selected_value = panel.selected_value().map(|v| v.to_string());
    let rows: Vec<(String, String)> = panel
        .result()
        .map(|r| r.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        .unwrap_or_default();
    let keys: Vec<String> = rows.iter().map(|(k, _)| k.clone()).collect();

    rsx! {
        div { class: "forecast-panel",
            div { class: "panel-header",
                span { class: "panel-icon", "{topic.icon}" }
                h2 { "{topic.title}" }
                button {
                    class: "close",
                    title: "Close",
                    onclick: move |_| on_close.call(()),
                    "×"
                }
            }

            h3 { "{heading}" }

            form {
                class: "forecast-form",
                onsubmit: move |evt: Event<FormData>| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                {year_field(dashboard, &years, panel.params().year())}
                {fields}
                button {
                    r#type: "submit",
                    class: "primary",
                    if status == ForecastStatus::Pending { "Forecasting…" } else { "Get forecast" }
                }
            }

            if let Some(message) = validation {
                p { class: "validation-error", "{message}" }
            }

            if let Some(message) = failure {
                div { class: "fetch-error",
                    span { "{message}" }
                    button {
                        class: "secondary",
                        onclick: move |_| on_retry.call(()),
                        "Retry"
                    }
                }
            }

            if !rows.is_empty() {
                div { class: if stale { "result stale" } else { "result" },
                    if stale {
                        span { class: "stale-badge", "Out of date" }
                    }
                    select {
                        onchange: move |evt: Event<FormData>| {
                            let key = evt.value();
                            if let Some(panel) = dashboard.write().panel_mut() {
                                if let Err(e) = panel.select_result_key(&key) {
                                    tracing::warn!(error = %e, "result key not selectable");
                                }
                            }
                        },
                        for key in keys {
                            option {
                                value: "{key}",
                                selected: key == selected_key,
                                "{key}"
                            }
                        }
                    }
                    if let Some(value) = selected_value {
                        div { class: "result-value", "{value}" }
                    }
                    table {
                        for (key, value) in rows {
                            tr {
                                class: if key == selected_key { "selected" } else { "" },
                                td { "{key}" }
                                td { "{value}" }
                            }
                        }
                    }
                }
            }

            {reference_chart(topic.reference)}
        }
    }
}
