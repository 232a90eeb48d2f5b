mod entities;
mod history;

use std::{ops::Range, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::{
    Client,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

pub use self::entities::Entity;
use self::{entities::EntityState, history::EntityHistory};
use crate::{
    api::client::fetch_json,
    core::{provider::HistoryProvider, reading::ReadingSeries},
    prelude::*,
};

/// [Home Assistant REST API](https://developers.home-assistant.io/docs/api/rest/) client.
pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    pub fn try_new(access_token: &str, base_url: Url) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
        authorization.set_sensitive(true);
        let client = Client::builder()
            .default_headers(HeaderMap::from_iter([(AUTHORIZATION, authorization)]))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL: `{}`", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch the entities which report power.
    #[instrument(skip_all)]
    pub async fn get_power_entities(&self) -> Result<Vec<Entity>> {
        let states: Vec<EntityState> = fetch_json(self.client.get(self.url(["states"])?)).await?;
        let entities: Vec<Entity> = states.into_iter().filter_map(EntityState::into_power).collect();
        info!(n_entities = entities.len(), "fetched");
        Ok(entities)
    }
}

#[async_trait]
impl HistoryProvider for Api {
    #[instrument(skip_all, fields(entity_id = entity_id))]
    async fn get_readings(
        &self,
        entity_id: &str,
        period: Range<DateTime<Local>>,
    ) -> Result<ReadingSeries> {
        let mut url = self.url(["history", "period", period.start.to_rfc3339().as_str()])?;
        url.query_pairs_mut()
            .append_pair("filter_entity_id", entity_id)
            .append_pair("end_time", &period.end.to_rfc3339());
        let entities_history: Vec<EntityHistory> = fetch_json(self.client.get(url)).await?;
        let series = entities_history
            .into_iter()
            .next()
            .map(|history| history.into_series(entity_id))
            .unwrap_or_else(|| ReadingSeries::from_readings(entity_id, None, Vec::new()));
        info!(n_readings = series.readings.len(), unit = ?series.unit_of_measurement, "fetched");
        Ok(series)
    }
}
