use std::ops::Range;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        forecast::{SolarForecast, SolarSite},
        reading::ReadingSeries,
    },
    prelude::*,
};

/// Source of the historical sensor readings.
#[async_trait]
pub trait HistoryProvider: Sync {
    /// Fetch the readings of the entity within the period, possibly none.
    async fn get_readings(
        &self,
        entity_id: &str,
        period: Range<DateTime<Local>>,
    ) -> Result<ReadingSeries>;
}

/// Source of the solar production estimates.
#[async_trait]
pub trait ForecastProvider: Sync {
    /// Fetch the production estimate with the timestamps already converted into absolute instants.
    async fn estimate(&self, site: &SolarSite) -> Result<SolarForecast>;

    /// Ask the provider to validate the site geometry.
    async fn check(&self, site: &SolarSite) -> Result<SiteCheck>;
}

/// Provider's diagnostic of a valid site.
#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteCheck {
    pub place: Option<String>,
    pub timezone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
