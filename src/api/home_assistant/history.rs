use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_with::serde_as;

use crate::{
    api::home_assistant::entities::Attributes,
    core::reading::{Reading, ReadingSeries},
    quantity::power::Watts,
};

/// State changes of a single entity, skipping the non-numeric ones like `unavailable`.
#[must_use]
#[serde_as]
#[derive(Deserialize)]
pub struct EntityHistory(#[serde_as(as = "serde_with::VecSkipError<_>")] pub Vec<State>);

#[must_use]
#[serde_as]
#[derive(Deserialize)]
pub struct State {
    #[serde(rename = "last_changed")]
    pub last_changed_at: DateTime<Local>,

    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(rename = "state")]
    pub value: f64,

    #[serde(default)]
    pub attributes: Attributes,
}

impl EntityHistory {
    pub fn into_series(self, entity_id: &str) -> ReadingSeries {
        let unit_of_measurement =
            self.0.first().and_then(|state| state.attributes.unit_of_measurement.clone());
        let readings = self
            .0
            .into_iter()
            .map(|state| Reading::new(state.last_changed_at, Watts::from(state.value)))
            .collect();
        ReadingSeries::from_readings(entity_id, unit_of_measurement, readings)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_deserialize_entities_history_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            [
                [
                    {
                        "entity_id": "sensor.randometer",
                        "state": "unavailable",
                        "attributes": {
                            "unit_of_measurement": "W",
                            "device_class": "power",
                            "friendly_name": "Randometer"
                        },
                        "last_changed": "2024-07-08T06:43:40.326747+00:00",
                        "last_updated": "2024-07-08T06:43:40.326747+00:00"
                    },
                    {
                        "entity_id": "sensor.randometer",
                        "state": "3410",
                        "attributes": {
                            "unit_of_measurement": "W",
                            "device_class": "power",
                            "friendly_name": "Randometer"
                        },
                        "last_changed": "2024-07-08T06:43:44+00:00",
                        "last_updated": "2024-07-08T06:43:44+00:00"
                    },
                    {
                        "entity_id": "sensor.randometer",
                        "state": "3124.5",
                        "attributes": {
                            "unit_of_measurement": "W",
                            "device_class": "power",
                            "friendly_name": "Randometer"
                        },
                        "last_changed": "2024-07-08T06:57:33+00:00",
                        "last_updated": "2024-07-08T06:57:33+00:00"
                    }
                ]
            ]
        "#;
        let history = serde_json::from_str::<Vec<EntityHistory>>(RESPONSE)?;
        assert_eq!(history.len(), 1);

        let series = history.into_iter().next().unwrap().into_series("sensor.randometer");
        assert_eq!(series.readings.len(), 2);
        assert_eq!(series.unit_of_measurement.as_deref(), Some("W"));
        assert_abs_diff_eq!(series.readings[1].value.0, 3124.5);
        assert_eq!(
            series.first_reading_at,
            Some(Local.timestamp_opt(1_720_421_024, 0).unwrap()),
        );
        assert_eq!(series.last_reading_at, Some(series.readings[1].timestamp));
        Ok(())
    }

    #[test]
    fn test_deserialize_empty_history_ok() -> Result {
        let history = serde_json::from_str::<Vec<EntityHistory>>("[]")?;
        assert!(history.is_empty());
        Ok(())
    }
}
