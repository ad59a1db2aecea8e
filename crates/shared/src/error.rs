use thiserror::Error;

/// User input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("year {year} is outside the forecast horizon ({first}-{last})")]
    YearOutOfRange { year: i32, first: i32, last: i32 },
    #[error("month {0} is not between 1 and 12")]
    InvalidMonth(u32),
    #[error("{year}-{month:02} has no day {day}")]
    InvalidDay { year: i32, month: u32, day: u32 },
    #[error("temperature '{0}' is not a number")]
    InvalidTemperature(String),
    #[error("temperature {value} °C is outside {min}..{max} °C")]
    TemperatureOutOfRange { value: f64, min: f64, max: f64 },
}

/// A forecast call that did not produce a usable result.
///
/// Schema failures are reported like transport failures: the panel shows a
/// retry affordance and keeps its previous result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("could not reach the prediction service: {0}")]
    Transport(String),
    #[error("prediction service answered HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response from the prediction service: {0}")]
    Schema(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("no forecast result to select from")]
    NoResult,
    #[error("'{0}' is not a key of the current result")]
    UnknownResultKey(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("no topic is open")]
    NoSelection,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} bounds are empty or not finite")]
    InvalidBounds(&'static str),
    #[error("home region must lie inside the map bounds")]
    HomeRegionOutsideBounds,
    #[error("home center must lie inside the home region")]
    HomeCenterOutsideRegion,
    #[error("zoom limits are inconsistent: min {min}, home {home}, max {max}")]
    InvalidZoom { min: f64, home: f64, max: f64 },
    #[error("detail zoom {detail} is outside {min}..{max}")]
    DetailZoomOutOfRange { detail: f64, min: f64, max: f64 },
    #[error("fallback temperature {value} °C is outside {min}..{max} °C")]
    FallbackTemperatureOutOfRange { value: f64, min: f64, max: f64 },
    #[error("marker '{0}' lies outside the map bounds")]
    MarkerOutsideBounds(String),
}
