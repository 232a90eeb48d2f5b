use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::quantity::power::Watts;

/// Single sensor sample.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Local>,
    pub value: Watts,
}

impl Reading {
    pub const fn new(timestamp: DateTime<Local>, value: Watts) -> Self {
        Self { timestamp, value }
    }
}

/// Sensor readings of a single entity within a closed period, in ascending order.
#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSeries {
    pub entity_id: String,

    pub first_reading_at: Option<DateTime<Local>>,
    pub last_reading_at: Option<DateTime<Local>>,

    pub unit_of_measurement: Option<String>,

    pub readings: Vec<Reading>,
}

impl ReadingSeries {
    /// Build the series from the ordered readings, deriving the first and last timestamps.
    pub fn from_readings(
        entity_id: impl Into<String>,
        unit_of_measurement: Option<String>,
        readings: Vec<Reading>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            first_reading_at: readings.first().map(|reading| reading.timestamp),
            last_reading_at: readings.last().map(|reading| reading.timestamp),
            unit_of_measurement,
            readings,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
