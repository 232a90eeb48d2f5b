//! [Forecast.Solar](https://doc.forecast.solar/api) client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Local, MappedLocalTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::{
    api::client::{self, fetch_json},
    core::{
        forecast::{ForecastInfo, ForecastPoint, SolarForecast, SolarSite},
        provider::{ForecastProvider, SiteCheck},
    },
    error::Failure,
    prelude::*,
    quantity::power::Watts,
};

pub const DEFAULT_BASE_URL: &str = "https://api.forecast.solar";

pub struct Api {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl Api {
    pub fn try_new(base_url: Url, api_key: Option<String>) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url, api_key })
    }

    /// Build `{base}/[{key}/]{endpoint}/{lat}/{lon}/{dec}/{az}/{kwp}`.
    fn url(&self, endpoint: &str, site: &SolarSite) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow!("invalid base URL: `{}`", self.base_url))?;
            segments.pop_if_empty();
            if let Some(api_key) = &self.api_key {
                segments.push(api_key);
            }
            segments.push(endpoint).extend(
                [site.latitude, site.longitude, site.declination, site.azimuth, site.max_power_kw]
                    .map(|value| value.to_string()),
            );
        }
        Ok(url)
    }
}

#[async_trait]
impl ForecastProvider for Api {
    #[instrument(skip_all, fields(site = %site))]
    async fn estimate(&self, site: &SolarSite) -> Result<SolarForecast> {
        let response: Response<Estimate> =
            fetch_json(self.client.get(self.url("estimate", site)?)).await?;
        let forecast = response.try_into_forecast()?;
        info!(
            n_points = forecast.intervals.len(),
            begin_at = %forecast.info.begin_at,
            end_at = %forecast.info.end_at,
            timezone = %forecast.info.timezone,
            "fetched",
        );
        Ok(forecast)
    }

    #[instrument(skip_all, fields(site = %site))]
    async fn check(&self, site: &SolarSite) -> Result<SiteCheck> {
        let response = self
            .client
            .get(self.url("check", site)?)
            .send()
            .await
            .map_err(|error| Failure::UpstreamFailure(format!("failed to call: {error}")))?;
        let status = response.status();
        info!(%status, "received");

        if !status.is_success() {
            // The rejection reason comes in the usual envelope:
            let reason = response
                .json::<Response<serde_json::Value>>()
                .await
                .ok()
                .map(|response| response.message.text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status.to_string());
            return Err(check_failure(status, reason).into());
        }

        let response: Response<serde_json::Value> = response
            .json()
            .await
            .map_err(|error| Failure::UpstreamFailure(format!("malformed response: {error}")))?;
        let info = response.message.info.ok_or_else(|| {
            Failure::UpstreamFailure("the check response carries no site information".to_owned())
        })?;
        Ok(SiteCheck {
            place: info.place,
            timezone: Some(info.timezone),
            latitude: info.latitude,
            longitude: info.longitude,
        })
    }
}

/// Client errors mean the site was rejected, except for the rate limit.
fn check_failure(status: StatusCode, reason: String) -> Failure {
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        Failure::ValidationFailure(reason)
    } else {
        Failure::UpstreamFailure(format!("{status}: {reason}"))
    }
}

#[derive(Deserialize)]
struct Response<R> {
    result: Option<R>,

    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    text: String,

    #[serde(default)]
    info: Option<MessageInfo>,
}

#[derive(Deserialize)]
struct MessageInfo {
    latitude: f64,
    longitude: f64,

    #[serde(default)]
    place: Option<String>,

    timezone: String,
}

#[derive(Deserialize)]
struct Estimate {
    /// Expected power by the provider-local timestamp.
    #[serde(default)]
    watts: BTreeMap<String, f64>,
}

impl Response<Estimate> {
    /// Convert the provider-local timestamps into absolute instants using the reported time zone.
    fn try_into_forecast(self) -> Result<SolarForecast> {
        let watts = self
            .result
            .map(|estimate| estimate.watts)
            .filter(|watts| !watts.is_empty())
            .ok_or_else(|| {
                Failure::UpstreamFailure("the provider returned no wattage data".to_owned())
            })?;
        let info = self.message.info.ok_or_else(|| {
            Failure::UpstreamFailure("the estimate carries no site information".to_owned())
        })?;
        let timezone: Tz = info.timezone.parse().map_err(|error| {
            Failure::UpstreamFailure(format!("unknown time zone `{}`: {error}", info.timezone))
        })?;

        let mut intervals = Vec::with_capacity(watts.len());
        for (timestamp, power) in watts {
            let naive = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%d %H:%M:%S")
                .map_err(|error| {
                    Failure::UpstreamFailure(format!("malformed timestamp `{timestamp}`: {error}"))
                })?;
            match timezone.from_local_datetime(&naive) {
                MappedLocalTime::Single(timestamp) | MappedLocalTime::Ambiguous(timestamp, _) => {
                    intervals.push(ForecastPoint {
                        timestamp: timestamp.with_timezone(&Local),
                        power: Watts::from(power),
                    });
                }
                MappedLocalTime::None => {
                    return Err(Failure::UpstreamFailure(format!(
                        "`{timestamp}` does not exist in `{timezone}`"
                    ))
                    .into());
                }
            }
        }
        intervals.sort_by_key(|point| point.timestamp);

        let (Some(first), Some(last)) = (intervals.first(), intervals.last()) else {
            return Err(Failure::UpstreamFailure("no valid forecast timestamps".to_owned()).into());
        };
        Ok(SolarForecast {
            info: ForecastInfo {
                begin_at: first.timestamp,
                end_at: last.timestamp,
                timezone: info.timezone,
                place: info.place,
                latitude: info.latitude,
                longitude: info.longitude,
            },
            intervals,
        })
    }
}
