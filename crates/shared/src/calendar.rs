use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

/// Number of calendar years (including the current one) offered for forecasts.
pub const FORECAST_HORIZON_YEARS: i32 = 11;

/// Day count of `month` in `year`, or `None` for an invalid month/year.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Weekday of a date, 0 = Sunday through 6 = Saturday.
pub fn day_of_week(year: i32, month: u32, day: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.weekday().num_days_from_sunday())
}

/// Years a forecast may be requested for, starting at the current year.
pub fn forecast_years(today: NaiveDate) -> RangeInclusive<i32> {
    let first = today.year();
    first..=first + FORECAST_HORIZON_YEARS - 1
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One of the discrete 3-hourly forecast times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u32,
}

impl TimeOfDay {
    pub const SLOTS: [TimeOfDay; 8] = [
        TimeOfDay { hour: 0 },
        TimeOfDay { hour: 3 },
        TimeOfDay { hour: 6 },
        TimeOfDay { hour: 9 },
        TimeOfDay { hour: 12 },
        TimeOfDay { hour: 15 },
        TimeOfDay { hour: 18 },
        TimeOfDay { hour: 21 },
    ];

    /// The slot starting at `hour`, if there is one.
    pub fn from_hour(hour: u32) -> Option<Self> {
        Self::SLOTS.iter().copied().find(|t| t.hour == hour)
    }

    pub fn hour(self) -> u32 {
        self.hour
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:00", self.hour)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    /// Accepts `"HH:00"` or a bare hour.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hour_part = match trimmed.split_once(':') {
            Some((h, "00")) => h,
            Some(_) => return Err(format!("unsupported time of day: {}", s)),
            None => trimmed,
        };
        let hour: u32 = hour_part
            .parse()
            .map_err(|_| format!("unsupported time of day: {}", s))?;
        TimeOfDay::from_hour(hour).ok_or_else(|| format!("unsupported time of day: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_leap(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    fn reference_days(year: i32, month: u32) -> u32 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if is_leap(year) => 29,
            _ => 28,
        }
    }

    #[test]
    fn test_february_leap_years() {
        assert_eq!(days_in_month(2028, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2100, 2), Some(28));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        assert_eq!(days_in_month(2025, 12), Some(31));
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(days_in_month(2025, 0), None);
        assert_eq!(days_in_month(2025, 13), None);
    }

    proptest! {
        #[test]
        fn prop_days_in_month_matches_calendar(year in 1583i32..3000, month in 1u32..=12) {
            prop_assert_eq!(days_in_month(year, month), Some(reference_days(year, month)));
        }
    }

    #[test]
    fn test_day_of_week_new_year_2025_is_wednesday() {
        assert_eq!(day_of_week(2025, 1, 1), Some(3));
    }

    #[test]
    fn test_day_of_week_sunday_is_zero() {
        // 2025-01-05 was a Sunday
        assert_eq!(day_of_week(2025, 1, 5), Some(0));
        assert_eq!(day_of_week(2025, 1, 4), Some(6));
    }

    #[test]
    fn test_day_of_week_invalid_date() {
        assert_eq!(day_of_week(2025, 2, 29), None);
    }

    #[test]
    fn test_forecast_years_covers_eleven_years() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let years = forecast_years(today);
        assert_eq!(*years.start(), 2026);
        assert_eq!(*years.end(), 2036);
        assert_eq!(years.count(), 11);
    }

    #[test]
    fn test_time_of_day_parse() {
        assert_eq!("00:00".parse::<TimeOfDay>().unwrap().hour(), 0);
        assert_eq!("21:00".parse::<TimeOfDay>().unwrap().hour(), 21);
        assert_eq!("9".parse::<TimeOfDay>().unwrap().hour(), 9);
        assert!("04:00".parse::<TimeOfDay>().is_err());
        assert!("03:30".parse::<TimeOfDay>().is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_of_day_display() {
        assert_eq!(TimeOfDay::SLOTS[0].to_string(), "00:00");
        assert_eq!(TimeOfDay::SLOTS[3].to_string(), "09:00");
    }
}
