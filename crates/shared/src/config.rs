//! Dashboard tunables. Every field has a default, so a partial JSON document
//! (or none at all) is a valid configuration.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::{self, LatLng, LatLngBounds};
use crate::registry;
use crate::schema::{TEMPERATURE_MAX, TEMPERATURE_MIN};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Fallback for the environment panel's temperature when no temperature
/// forecast has been made yet.
pub const DEFAULT_FALLBACK_TEMPERATURE: f64 = 26.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub home_center: LatLng,
    pub home_zoom: f64,
    /// Soft region; leaving it arms the snap-back timer.
    pub home_region: LatLngBounds,
    /// Hard wall; the camera center is clamped into it immediately.
    pub bounds: LatLngBounds,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub snap_back_grace_ms: u64,
    /// Duration of programmatic returns home.
    pub return_duration_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            home_center: geo::HOME_CENTER,
            home_zoom: geo::HOME_ZOOM,
            home_region: geo::HOME_REGION,
            bounds: geo::FIJI_BOUNDS,
            min_zoom: geo::MIN_ZOOM,
            max_zoom: geo::MAX_ZOOM,
            snap_back_grace_ms: 15_000,
            return_duration_ms: 2_000,
        }
    }
}

impl ViewportConfig {
    pub fn snap_back_grace(&self) -> Duration {
        Duration::from_millis(self.snap_back_grace_ms)
    }

    pub fn return_duration(&self) -> Duration {
        Duration::from_millis(self.return_duration_ms)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            self.home_zoom
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bounds.is_valid() {
            return Err(ConfigError::InvalidBounds("map"));
        }
        if !self.home_region.is_valid() {
            return Err(ConfigError::InvalidBounds("home region"));
        }
        if !self.bounds.contains_bounds(&self.home_region) {
            return Err(ConfigError::HomeRegionOutsideBounds);
        }
        if !self.home_region.contains(self.home_center) {
            return Err(ConfigError::HomeCenterOutsideRegion);
        }
        let zoom_ok = self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom <= self.home_zoom
            && self.home_zoom <= self.max_zoom;
        if !zoom_ok {
            return Err(ConfigError::InvalidZoom {
                min: self.min_zoom,
                home: self.home_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Zoom used when flying to a selected marker.
    pub detail_zoom: f64,
    pub fly_duration_ms: u64,
    /// Delay between closing a panel and the camera heading home.
    pub return_delay_ms: u64,
    pub fallback_temperature: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            detail_zoom: 13.0,
            fly_duration_ms: 2_000,
            return_delay_ms: 300,
            fallback_temperature: DEFAULT_FALLBACK_TEMPERATURE,
        }
    }
}

impl InteractionConfig {
    pub fn fly_duration(&self) -> Duration {
        Duration::from_millis(self.fly_duration_ms)
    }

    pub fn return_delay(&self) -> Duration {
        Duration::from_millis(self.return_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root URL of the prediction service, without the endpoint path.
    pub api_base_url: String,
    pub viewport: ViewportConfig,
    pub interaction: InteractionConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            viewport: ViewportConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        let detail = self.interaction.detail_zoom;
        if !(self.viewport.min_zoom..=self.viewport.max_zoom).contains(&detail) {
            return Err(ConfigError::DetailZoomOutOfRange {
                detail,
                min: self.viewport.min_zoom,
                max: self.viewport.max_zoom,
            });
        }
        let fallback = self.interaction.fallback_temperature;
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&fallback) {
            return Err(ConfigError::FallbackTemperatureOutOfRange {
                value: fallback,
                min: TEMPERATURE_MIN,
                max: TEMPERATURE_MAX,
            });
        }
        registry::validate_within(&self.viewport.bounds)
    }
}
