//! Which topic is open, and the glue between marker clicks, the camera and the
//! open forecast panel.
use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::error::{ConfigError, FetchError, SubmitError};
use crate::geo::LatLngBounds;
use crate::panel::{Disposition, ForecastPanel, ForecastTicket, PanelId};
use crate::registry::{self, Topic, TopicId};
use crate::schema::ForecastKind;
use crate::viewport::{AnimationId, TimerId, ViewportController, ViewportEffect};
use crate::wire::{ForecastResult, PREDICTION_KEY};

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Idle,
    Selected { topic: TopicId, panel: ForecastPanel },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    config: DashboardConfig,
    viewport: ViewportController,
    selection: Selection,
    next_panel: u64,
    /// Most recent successful temperature prediction, seeds environment panels.
    last_temperature: Option<f64>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = ViewportController::initialize(config.viewport.clone())?;
        Ok(Dashboard {
            config,
            viewport,
            selection: Selection::Idle,
            next_panel: 0,
            last_temperature: None,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_topic(&self) -> Option<&'static Topic> {
        match &self.selection {
            Selection::Idle => None,
            Selection::Selected { topic, .. } => Some(registry::topic(*topic)),
        }
    }

    pub fn panel(&self) -> Option<&ForecastPanel> {
        match &self.selection {
            Selection::Idle => None,
            Selection::Selected { panel, .. } => Some(panel),
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut ForecastPanel> {
        match &mut self.selection {
            Selection::Idle => None,
            Selection::Selected { panel, .. } => Some(panel),
        }
    }

    pub fn last_temperature(&self) -> Option<f64> {
        self.last_temperature
    }

    /// Temperature an environment panel opens with.
    pub fn default_temperature(&self) -> f64 {
        self.last_temperature
            .unwrap_or(self.config.interaction.fallback_temperature)
    }

    /// Open `id` and fly to its marker. A different topic gets a fresh panel;
    /// clicking the open topic again only re-focuses the camera.
    pub fn select_marker(&mut self, id: TopicId) -> Vec<ViewportEffect> {
        let topic = registry::topic(id);
        let already_open = matches!(&self.selection, Selection::Selected { topic, .. } if *topic == id);
        if !already_open {
            self.next_panel += 1;
            let panel = ForecastPanel::new(PanelId(self.next_panel), id, self.default_temperature());
            if let Selection::Selected { topic: previous, .. } = &self.selection {
                tracing::debug!(from = %previous, to = %id, "switching topic, previous panel discarded");
            }
            self.selection = Selection::Selected { topic: id, panel };
        }
        tracing::info!(topic = %id, title = topic.title, "topic selected");
        let interaction = &self.config.interaction;
        self.viewport
            .focus_on(topic.position, interaction.detail_zoom, interaction.fly_duration())
    }

    /// Close the open panel and schedule the return home. No-op when idle.
    pub fn clear_selection(&mut self) -> Vec<ViewportEffect> {
        match std::mem::replace(&mut self.selection, Selection::Idle) {
            Selection::Idle => Vec::new(),
            Selection::Selected { topic, .. } => {
                tracing::info!(topic = %topic, "panel closed");
                self.viewport
                    .release_focus(self.config.interaction.return_delay())
            }
        }
    }

    pub fn submit_forecast(&mut self, today: NaiveDate) -> Result<ForecastTicket, SubmitError> {
        let panel = self.panel_mut().ok_or(SubmitError::NoSelection)?;
        Ok(panel.submit(today)?)
    }

    pub fn retry_forecast(&mut self, today: NaiveDate) -> Result<ForecastTicket, SubmitError> {
        let panel = self.panel_mut().ok_or(SubmitError::NoSelection)?;
        Ok(panel.retry(today)?)
    }

    /// Route a response back to the panel that issued `ticket`.
    pub fn apply_forecast(
        &mut self,
        ticket: &ForecastTicket,
        outcome: Result<ForecastResult, FetchError>,
    ) -> Disposition {
        let panel = match &mut self.selection {
            Selection::Selected { panel, .. } if panel.id() == ticket.panel => panel,
            _ => {
                tracing::debug!(panel = ticket.panel.0, seq = ticket.seq, "response for a closed panel discarded");
                return Disposition::PanelClosed;
            }
        };
        let disposition = panel.apply_response(ticket.seq, outcome);
        if disposition == Disposition::Applied && panel.kind() == ForecastKind::Temperature {
            let prediction = panel
                .result()
                .and_then(|r| r.get(PREDICTION_KEY))
                .and_then(|v| v.as_number());
            if let Some(p) = prediction {
                self.last_temperature = Some(p);
            }
        }
        disposition
    }

    pub fn on_viewport_moved(&mut self, visible: LatLngBounds, zoom: f64) -> Vec<ViewportEffect> {
        self.viewport.on_viewport_moved(visible, zoom)
    }

    pub fn on_timer_fired(&mut self, timer: TimerId) -> Vec<ViewportEffect> {
        self.viewport.on_timer_fired(timer)
    }

    pub fn on_animation_finished(&mut self, animation: AnimationId) -> bool {
        self.viewport.on_animation_finished(animation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ForecastParams;
    use crate::viewport::TimerPurpose;
    use crate::wire::parse_response;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let d = dashboard();
        assert_eq!(d.selection(), &Selection::Idle);
        assert!(d.panel().is_none());
        assert_eq!(d.default_temperature(), 26.5);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut cfg = DashboardConfig::default();
        cfg.interaction.detail_zoom = 2.0;
        assert!(Dashboard::new(cfg).is_err());
    }

    #[test]
    fn test_select_marker_flies_to_topic() {
        let mut d = dashboard();
        let effects = d.select_marker(TopicId::Temperature);
        assert_eq!(effects.len(), 1);
        match effects[0] {
            ViewportEffect::FlyTo { center, zoom, duration, .. } => {
                assert_eq!(center, registry::topic(TopicId::Temperature).position);
                assert_eq!(zoom, 13.0);
                assert_eq!(duration, std::time::Duration::from_secs(2));
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(d.selected_topic().map(|t| t.title), Some("Air Temperature"));
    }

    #[test]
    fn test_reselecting_same_topic_keeps_panel() {
        let mut d = dashboard();
        d.select_marker(TopicId::Economy);
        d.panel_mut().unwrap().params_mut().set_year(Some(2026));
        let id = d.panel().unwrap().id();
        d.select_marker(TopicId::Economy);
        assert_eq!(d.panel().unwrap().id(), id);
        assert_eq!(d.panel().unwrap().params().year(), Some(2026));
    }

    #[test]
    fn test_clear_when_idle_is_noop() {
        let mut d = dashboard();
        assert!(d.clear_selection().is_empty());
        assert!(d.viewport().pending_timer().is_none());
    }

    #[test]
    fn test_clear_schedules_return_home() {
        let mut d = dashboard();
        d.select_marker(TopicId::Cyclone);
        let effects = d.clear_selection();
        assert!(matches!(
            effects[..],
            [ViewportEffect::ArmTimer { delay, .. }] if delay == std::time::Duration::from_millis(300)
        ));
        assert_eq!(d.viewport().pending_timer().unwrap().purpose, TimerPurpose::ReturnHome);
        assert_eq!(d.selection(), &Selection::Idle);
    }

    #[test]
    fn test_submit_without_selection() {
        let mut d = dashboard();
        assert_eq!(d.submit_forecast(today()), Err(SubmitError::NoSelection));
    }

    #[test]
    fn test_submit_validation_error_is_wrapped() {
        let mut d = dashboard();
        d.select_marker(TopicId::Tourism);
        assert!(matches!(d.submit_forecast(today()), Err(SubmitError::Validation(_))));
    }

    #[test]
    fn test_response_for_closed_panel_is_discarded() {
        let mut d = dashboard();
        d.select_marker(TopicId::Economy);
        d.panel_mut().unwrap().params_mut().set_year(Some(2026));
        let ticket = d.submit_forecast(today()).unwrap();
        d.clear_selection();
        d.select_marker(TopicId::Economy);

        let result = parse_response(ForecastKind::Economy, r#"{"gdp_growth": 3.0}"#).unwrap();
        assert_eq!(d.apply_forecast(&ticket, Ok(result)), Disposition::PanelClosed);
        assert!(d.panel().unwrap().result().is_none());
    }

    #[test]
    fn test_temperature_prediction_seeds_environment_panel() {
        let mut d = dashboard();
        d.select_marker(TopicId::Temperature);
        if let Some(ForecastParams::Temperature(p)) = d.panel_mut().map(|p| p.params_mut()) {
            p.set_year(Some(2026));
            p.set_month(Some(7));
            p.day = Some(4);
            p.time = crate::calendar::TimeOfDay::from_hour(12);
        }
        let ticket = d.submit_forecast(today()).unwrap();
        let body = r#"{"prediction": 23.75, "range": {"lower": 22.0, "upper": 25.5}}"#;
        let result = parse_response(ForecastKind::Temperature, body).unwrap();
        assert_eq!(d.apply_forecast(&ticket, Ok(result)), Disposition::Applied);
        assert_eq!(d.last_temperature(), Some(23.75));

        d.select_marker(TopicId::Cyclone);
        match d.panel().unwrap().params() {
            ForecastParams::Environment(p) => assert_eq!(p.temperature, "23.75"),
            other => panic!("unexpected params {:?}", other),
        }
    }
}
