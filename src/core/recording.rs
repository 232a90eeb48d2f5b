use std::num::NonZeroU32;

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::quantity::{energy::WattHours, power::Watts};

/// Statistics of the readings which fell into one fixed-width bucket.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionInterval {
    pub average_power: Watts,
    pub std_deviation: Watts,
}

/// Bucketed representation of a historical consumption episode.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecording {
    #[builder(into, default = uuid::Uuid::new_v4().to_string())]
    pub id: String,

    #[builder(into, default)]
    pub name: String,

    #[builder(into, default)]
    pub entity_id: String,

    #[serde(default)]
    pub unit_of_measurement: Option<String>,

    pub interval_length_minutes: NonZeroU32,

    pub intervals: Vec<ConsumptionInterval>,

    #[serde(rename = "totalConsumptionWh")]
    pub total_consumption: WattHours,

    #[builder(default = Local::now())]
    pub recorded_at: DateTime<Local>,
}

impl ConsumptionRecording {
    #[must_use]
    pub fn interval_length(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.interval_length_minutes.get()))
    }

    /// Total time covered by the intervals.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.interval_length() * i32::try_from(self.intervals.len()).unwrap_or(i32::MAX)
    }

    /// Highest average power over the intervals.
    pub fn peak_power(&self) -> Watts {
        self.intervals.iter().map(|interval| interval.average_power).fold(Watts::ZERO, Watts::max)
    }
}
