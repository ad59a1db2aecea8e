//! The fixed set of dashboard topics and their map markers.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::{LatLng, LatLngBounds};
use crate::schema::ForecastKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicId {
    #[serde(rename = "temp")]
    Temperature,
    #[serde(rename = "econ")]
    Economy,
    Tourism,
    #[serde(rename = "infra")]
    Infrastructure,
    Cyclone,
}

impl TopicId {
    /// Short id used in URLs.
    pub fn slug(self) -> &'static str {
        match self {
            TopicId::Temperature => "temp",
            TopicId::Economy => "econ",
            TopicId::Tourism => "tourism",
            TopicId::Infrastructure => "infra",
            TopicId::Cyclone => "cyclone",
        }
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TopicId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TOPICS
            .iter()
            .map(|t| t.id)
            .find(|id| id.slug() == s)
            .ok_or_else(|| format!("unknown topic: {}", s))
    }
}

/// Static context series shown alongside a topic's forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSeries {
    pub label: &'static str,
    pub points: &'static [(&'static str, f64)],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topic {
    pub id: TopicId,
    pub title: &'static str,
    pub position: LatLng,
    /// Glyph rendered as the marker icon.
    pub icon: &'static str,
    pub forecast: ForecastKind,
    pub reference: ReferenceSeries,
}

static TOPICS: [Topic; 5] = [
    Topic {
        id: TopicId::Temperature,
        title: "Air Temperature",
        position: LatLng::new(-17.7, 178.1),
        icon: "⛅",
        forecast: ForecastKind::Temperature,
        reference: ReferenceSeries {
            label: "Monthly mean (°C)",
            points: &[("Jan", 24.0), ("Feb", 26.0), ("Mar", 29.0), ("Apr", 30.0), ("May", 32.0)],
        },
    },
    Topic {
        id: TopicId::Economy,
        title: "Economic Impact",
        position: LatLng::new(-16.5, 179.0),
        icon: "🌿",
        forecast: ForecastKind::Economy,
        reference: ReferenceSeries {
            label: "GDP growth (%)",
            points: &[("2019", 3.5), ("2020", 2.1), ("2021", 4.0), ("2022", 5.2)],
        },
    },
    Topic {
        id: TopicId::Tourism,
        title: "Tourism",
        position: LatLng::new(-17.6, 177.0),
        icon: "👥",
        forecast: ForecastKind::Economy,
        reference: ReferenceSeries {
            label: "Visitor arrivals",
            points: &[("Q1", 12000.0), ("Q2", 18000.0), ("Q3", 22000.0), ("Q4", 15000.0)],
        },
    },
    Topic {
        id: TopicId::Infrastructure,
        title: "Infrastructure",
        position: LatLng::new(-16.85, 179.9),
        icon: "🏥",
        forecast: ForecastKind::Mortality,
        reference: ReferenceSeries {
            label: "Facilities",
            points: &[("Bridges", 65.0), ("Roads", 120.0), ("Hospitals", 12.0), ("Schools", 40.0)],
        },
    },
    Topic {
        id: TopicId::Cyclone,
        title: "Cyclone Data",
        position: LatLng::new(-19.0, 178.5),
        icon: "🛣️",
        forecast: ForecastKind::Environment,
        reference: ReferenceSeries {
            label: "Cyclones per season",
            points: &[("2018", 2.0), ("2019", 1.0), ("2020", 3.0), ("2021", 2.0)],
        },
    },
];

/// All topics in display order.
pub fn topics() -> &'static [Topic] {
    &TOPICS
}

pub fn topic(id: TopicId) -> &'static Topic {
    match id {
        TopicId::Temperature => &TOPICS[0],
        TopicId::Economy => &TOPICS[1],
        TopicId::Tourism => &TOPICS[2],
        TopicId::Infrastructure => &TOPICS[3],
        TopicId::Cyclone => &TOPICS[4],
    }
}

/// Every marker must be reachable inside the hard map bounds.
pub fn validate_within(bounds: &LatLngBounds) -> Result<(), ConfigError> {
    match TOPICS.iter().find(|t| !bounds.contains(t.position)) {
        Some(t) => Err(ConfigError::MarkerOutsideBounds(t.id.to_string())),
        None => Ok(()),
    }
}
