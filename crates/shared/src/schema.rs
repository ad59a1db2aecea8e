//! Per-topic forecast parameters and their validation.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{self, TimeOfDay};
use crate::error::ValidationError;
use crate::wire::{EnvironmentRequest, ForecastRequest, TemperatureRequest, YearRequest};

/// Accepted input range for the environment model's temperature, in °C.
pub const TEMPERATURE_MIN: f64 = -30.0;
pub const TEMPERATURE_MAX: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    Temperature,
    Mortality,
    Environment,
    Economy,
}

impl ForecastKind {
    /// Path of the prediction endpoint, relative to the service root.
    pub fn endpoint(self) -> &'static str {
        match self {
            ForecastKind::Temperature => "predict-temperature",
            ForecastKind::Mortality => "predict-mortality",
            ForecastKind::Environment => "predict-environment",
            ForecastKind::Economy => "predict-economy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ForecastKind::Temperature => "Temperature forecast",
            ForecastKind::Mortality => "Population & mortality forecast",
            ForecastKind::Environment => "Environmental forecast",
            ForecastKind::Economy => "Economic forecast",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub time: Option<TimeOfDay>,
}

impl TemperatureParams {
    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
        self.clamp_day();
    }

    pub fn set_month(&mut self, month: Option<u32>) {
        self.month = month;
        self.clamp_day();
    }

    /// Days selectable for the current year/month; empty until both are set.
    pub fn day_choices(&self) -> std::ops::RangeInclusive<u32> {
        match (self.year, self.month) {
            (Some(y), Some(m)) => 1..=calendar::days_in_month(y, m).unwrap_or(0),
            _ => 1..=0,
        }
    }

    // A day that no longer exists (e.g. 31 after switching to April) is pulled
    // back to the last day of the month.
    fn clamp_day(&mut self) {
        if let (Some(y), Some(m), Some(d)) = (self.year, self.month, self.day) {
            if let Some(max) = calendar::days_in_month(y, m) {
                self.day = Some(d.min(max));
            }
        }
    }

    fn validate(&self, today: NaiveDate) -> Result<ForecastRequest, ValidationError> {
        let year = validate_year(self.year, today)?;
        let month = self.month.ok_or(ValidationError::Missing { field: "month" })?;
        let max_day = calendar::days_in_month(year, month).ok_or(ValidationError::InvalidMonth(month))?;
        let day = self.day.ok_or(ValidationError::Missing { field: "day" })?;
        if day == 0 || day > max_day {
            return Err(ValidationError::InvalidDay { year, month, day });
        }
        let time = self.time.ok_or(ValidationError::Missing { field: "time of day" })?;
        let dayofweek = calendar::day_of_week(year, month, day)
            .ok_or(ValidationError::InvalidDay { year, month, day })?;
        Ok(ForecastRequest::Temperature(TemperatureRequest {
            year,
            month,
            day,
            hour: time.hour(),
            dayofweek,
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearParams {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentParams {
    pub year: Option<i32>,
    /// Raw text of the temperature input.
    pub temperature: String,
}

impl EnvironmentParams {
    pub fn with_default_temperature(temperature: f64) -> Self {
        EnvironmentParams {
            year: None,
            temperature: format_temperature(temperature),
        }
    }

    fn validate(&self, today: NaiveDate) -> Result<ForecastRequest, ValidationError> {
        let year = validate_year(self.year, today)?;
        let raw = self.temperature.trim();
        if raw.is_empty() {
            return Err(ValidationError::Missing { field: "temperature" });
        }
        let temperature: f64 = raw
            .parse()
            .ok()
            .filter(|t: &f64| t.is_finite())
            .ok_or_else(|| ValidationError::InvalidTemperature(raw.to_string()))?;
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
            return Err(ValidationError::TemperatureOutOfRange {
                value: temperature,
                min: TEMPERATURE_MIN,
                max: TEMPERATURE_MAX,
            });
        }
        Ok(ForecastRequest::Environment(EnvironmentRequest { year, temperature }))
    }
}

/// Parameter state of one forecast panel, shaped by its topic's schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastParams {
    Temperature(TemperatureParams),
    Mortality(YearParams),
    Environment(EnvironmentParams),
    Economy(YearParams),
}

impl ForecastParams {
    /// Empty parameters for `kind`. Environment panels start from
    /// `default_temperature`.
    pub fn for_kind(kind: ForecastKind, default_temperature: f64) -> Self {
        match kind {
            ForecastKind::Temperature => ForecastParams::Temperature(TemperatureParams::default()),
            ForecastKind::Mortality => ForecastParams::Mortality(YearParams::default()),
            ForecastKind::Environment => {
                ForecastParams::Environment(EnvironmentParams::with_default_temperature(default_temperature))
            }
            ForecastKind::Economy => ForecastParams::Economy(YearParams::default()),
        }
    }

    pub fn kind(&self) -> ForecastKind {
        match self {
            ForecastParams::Temperature(_) => ForecastKind::Temperature,
            ForecastParams::Mortality(_) => ForecastKind::Mortality,
            ForecastParams::Environment(_) => ForecastKind::Environment,
            ForecastParams::Economy(_) => ForecastKind::Economy,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            ForecastParams::Temperature(p) => p.year,
            ForecastParams::Mortality(p) | ForecastParams::Economy(p) => p.year,
            ForecastParams::Environment(p) => p.year,
        }
    }

    /// Every schema has a year; temperature params also re-clamp their day.
    pub fn set_year(&mut self, year: Option<i32>) {
        match self {
            ForecastParams::Temperature(p) => p.set_year(year),
            ForecastParams::Mortality(p) | ForecastParams::Economy(p) => p.year = year,
            ForecastParams::Environment(p) => p.year = year,
        }
    }

    /// Check the parameters and build the request body. Nothing is sent when
    /// this fails.
    pub fn validate(&self, today: NaiveDate) -> Result<ForecastRequest, ValidationError> {
        match self {
            ForecastParams::Temperature(p) => p.validate(today),
            ForecastParams::Mortality(p) => {
                Ok(ForecastRequest::Mortality(YearRequest { year: validate_year(p.year, today)? }))
            }
            ForecastParams::Environment(p) => p.validate(today),
            ForecastParams::Economy(p) => {
                Ok(ForecastRequest::Economy(YearRequest { year: validate_year(p.year, today)? }))
            }
        }
    }
}

fn validate_year(year: Option<i32>, today: NaiveDate) -> Result<i32, ValidationError> {
    let year = year.ok_or(ValidationError::Missing { field: "year" })?;
    let horizon = calendar::forecast_years(today);
    if !horizon.contains(&year) {
        return Err(ValidationError::YearOutOfRange {
            year,
            first: *horizon.start(),
            last: *horizon.end(),
        });
    }
    Ok(year)
}

/// Temperature as pre-filled into a text input.
pub fn format_temperature(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn temperature(year: i32, month: u32, day: u32, hour: u32) -> TemperatureParams {
        TemperatureParams {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            time: TimeOfDay::from_hour(hour),
        }
    }

    #[test]
    fn test_new_year_2025_request() {
        let params = ForecastParams::Temperature(temperature(2025, 1, 1, 0));
        let req = params.validate(today()).unwrap();
        assert_eq!(
            req,
            ForecastRequest::Temperature(TemperatureRequest {
                year: 2025,
                month: 1,
                day: 1,
                hour: 0,
                dayofweek: 3,
            })
        );
    }

    #[test]
    fn test_leap_day_accepted_only_in_leap_year() {
        let ok = ForecastParams::Temperature(temperature(2028, 2, 29, 12));
        assert!(ok.validate(today()).is_ok());

        let bad = ForecastParams::Temperature(temperature(2027, 2, 29, 12));
        assert_eq!(
            bad.validate(today()),
            Err(ValidationError::InvalidDay { year: 2027, month: 2, day: 29 })
        );
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut p = TemperatureParams::default();
        let err = ForecastParams::Temperature(p.clone()).validate(today()).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "year" });

        p.year = Some(2026);
        let err = ForecastParams::Temperature(p.clone()).validate(today()).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "month" });

        p.month = Some(6);
        p.day = Some(10);
        let err = ForecastParams::Temperature(p).validate(today()).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "time of day" });
    }

    #[test]
    fn test_invalid_month_rejected() {
        let params = ForecastParams::Temperature(temperature(2026, 13, 1, 0));
        assert_eq!(params.validate(today()), Err(ValidationError::InvalidMonth(13)));
    }

    #[test]
    fn test_year_outside_horizon_rejected() {
        let past = ForecastParams::Economy(YearParams { year: Some(2024) });
        assert_eq!(
            past.validate(today()),
            Err(ValidationError::YearOutOfRange { year: 2024, first: 2025, last: 2035 })
        );
        let far = ForecastParams::Mortality(YearParams { year: Some(2036) });
        assert!(matches!(far.validate(today()), Err(ValidationError::YearOutOfRange { .. })));
        let last = ForecastParams::Mortality(YearParams { year: Some(2035) });
        assert!(last.validate(today()).is_ok());
    }

    #[test]
    fn test_switching_month_clamps_day() {
        let mut p = temperature(2025, 1, 31, 0);
        p.set_month(Some(4));
        assert_eq!(p.day, Some(30));
        p.set_month(Some(2));
        assert_eq!(p.day, Some(28));
        p.set_year(Some(2028));
        assert_eq!(p.day, Some(28));
    }

    #[test]
    fn test_day_choices_follow_month() {
        let mut p = TemperatureParams::default();
        assert_eq!(p.day_choices().count(), 0);
        p.set_year(Some(2028));
        p.set_month(Some(2));
        assert_eq!(p.day_choices().count(), 29);
    }

    #[test]
    fn test_environment_defaults_and_validation() {
        let mut params = ForecastParams::for_kind(ForecastKind::Environment, 26.5);
        match &params {
            ForecastParams::Environment(p) => assert_eq!(p.temperature, "26.5"),
            other => panic!("unexpected params {:?}", other),
        }
        params.set_year(Some(2030));
        assert_eq!(
            params.validate(today()),
            Ok(ForecastRequest::Environment(EnvironmentRequest { year: 2030, temperature: 26.5 }))
        );
    }

    #[test]
    fn test_environment_rejects_bad_temperature() {
        let mut p = EnvironmentParams { year: Some(2030), temperature: "warm".into() };
        assert_eq!(
            ForecastParams::Environment(p.clone()).validate(today()),
            Err(ValidationError::InvalidTemperature("warm".into()))
        );
        p.temperature = "  ".into();
        assert_eq!(
            ForecastParams::Environment(p.clone()).validate(today()),
            Err(ValidationError::Missing { field: "temperature" })
        );
        p.temperature = "NaN".into();
        assert!(matches!(
            ForecastParams::Environment(p.clone()).validate(today()),
            Err(ValidationError::InvalidTemperature(_))
        ));
        p.temperature = "75".into();
        assert!(matches!(
            ForecastParams::Environment(p).validate(today()),
            Err(ValidationError::TemperatureOutOfRange { .. })
        ));
    }

    #[test]
    fn test_for_kind_matches_kind() {
        for kind in [
            ForecastKind::Temperature,
            ForecastKind::Mortality,
            ForecastKind::Environment,
            ForecastKind::Economy,
        ] {
            assert_eq!(ForecastParams::for_kind(kind, 20.0).kind(), kind);
        }
    }

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(26.5), "26.5");
        assert_eq!(format_temperature(27.0), "27");
        assert_eq!(format_temperature(25.456), "25.46");
    }
}
