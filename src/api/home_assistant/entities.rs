use serde::{Deserialize, Serialize};

/// Entity reporting power, as listed to the user.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub name: Option<String>,
    pub unit_of_measurement: Option<String>,
}

#[derive(Deserialize)]
pub struct EntityState {
    entity_id: String,

    #[serde(default)]
    attributes: Attributes,
}

#[derive(Clone, Default, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub device_class: Option<String>,

    #[serde(default)]
    pub friendly_name: Option<String>,

    #[serde(default)]
    pub unit_of_measurement: Option<String>,
}

impl EntityState {
    pub fn into_power(self) -> Option<Entity> {
        (self.attributes.device_class.as_deref() == Some("power")).then(|| Entity {
            id: self.entity_id,
            name: self.attributes.friendly_name,
            unit_of_measurement: self.attributes.unit_of_measurement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_power_entities_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            [
                {
                    "entity_id": "sensor.washing_machine_power",
                    "state": "1.3",
                    "attributes": {
                        "state_class": "measurement",
                        "unit_of_measurement": "W",
                        "device_class": "power",
                        "friendly_name": "Washing machine power"
                    }
                },
                {
                    "entity_id": "sensor.washing_machine_energy",
                    "state": "39775.108",
                    "attributes": {
                        "unit_of_measurement": "kWh",
                        "device_class": "energy"
                    }
                },
                {
                    "entity_id": "sun.sun",
                    "state": "above_horizon",
                    "attributes": {}
                }
            ]
        "#;
        let entities: Vec<Entity> = serde_json::from_str::<Vec<EntityState>>(RESPONSE)?
            .into_iter()
            .filter_map(EntityState::into_power)
            .collect();
        assert_eq!(
            entities,
            vec![Entity {
                id: "sensor.washing_machine_power".to_owned(),
                name: Some("Washing machine power".to_owned()),
                unit_of_measurement: Some("W".to_owned()),
            }],
        );
        Ok(())
    }
}
