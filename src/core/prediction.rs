use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::quantity::{energy::WattHours, power::Watts};

/// Expected coverage of a single recording interval.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInterval {
    pub begin: DateTime<Local>,
    pub power_required: Watts,
    pub power_available: Watts,

    /// Shortfall of the available power, never negative.
    pub power_deficit: Watts,

    /// Available to required power ratio, exceeds one on surplus.
    pub coverage_ratio: f64,
}

/// Expected coverage of the whole recording started at `begin`.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub begin: DateTime<Local>,
    pub recording_id: String,

    #[serde(rename = "energyConsumptionWh")]
    pub energy_consumption: WattHours,

    #[serde(rename = "energyCoveredWh")]
    pub energy_covered: WattHours,

    /// Covered to consumed energy ratio, within `0.0..=1.0`.
    pub coverage_ratio: f64,

    pub intervals: Vec<PredictionInterval>,
}

/// Round the ratio to hundredths, half away from zero.
#[must_use]
pub fn round_ratio(ratio: f64) -> f64 {
    (ratio * 100.0).round() / 100.0
}
