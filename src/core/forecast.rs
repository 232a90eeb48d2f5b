use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::quantity::power::Watts;

/// Geometry of the solar panel installation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarSite {
    pub latitude: f64,
    pub longitude: f64,

    /// Panel inclination: 0° is horizontal, 90° is vertical.
    pub declination: f64,

    /// −180° is north, −90° is east, 0° is south, 90° is west.
    pub azimuth: f64,

    #[serde(rename = "maxPowerKW")]
    pub max_power_kw: f64,
}

impl Display for SolarSite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.latitude, self.longitude, self.declination, self.azimuth, self.max_power_kw,
        )
    }
}

/// Expected production at the given instant.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Local>,
    pub power: Watts,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastInfo {
    pub begin_at: DateTime<Local>,
    pub end_at: DateTime<Local>,

    /// Time zone the provider reported the estimate in.
    pub timezone: String,

    #[serde(default)]
    pub place: Option<String>,

    pub latitude: f64,
    pub longitude: f64,
}

/// Expected production curve, in ascending time order.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolarForecast {
    pub info: ForecastInfo,
    pub intervals: Vec<ForecastPoint>,
}

impl SolarForecast {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether the forecast may still be used on the specified local date.
    ///
    /// A forecast beginning today or later stays valid, one from a prior day does not.
    #[must_use]
    pub fn is_fresh_on(&self, today: NaiveDate) -> bool {
        !self.is_empty() && self.info.begin_at.date_naive() >= today
    }

    /// Power of the first point strictly after the timestamp, or zero past the horizon.
    #[must_use]
    pub fn power_after(&self, timestamp: DateTime<Local>) -> Watts {
        let index = self.intervals.partition_point(|point| point.timestamp <= timestamp);
        self.intervals.get(index).map_or(Watts::ZERO, |point| point.power)
    }
}
