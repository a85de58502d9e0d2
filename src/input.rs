//! Horizon and schedule files supplied by external collaborators.

use std::{fs, path::Path};

use chrono::{DateTime, Local};

use crate::{
    engine::{DemandForecast, Point, PriceSeries, Schedule, Series},
    prelude::*,
    quantity::{power::Kilowatts, rate::KilowattHourRate},
};

/// One line of the horizon file.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct HorizonSlot {
    pub time: DateTime<Local>,

    /// Day-ahead price in €/kWh.
    pub price: KilowattHourRate,

    /// Predicted net load in kW; negative is on-site production.
    #[serde(default)]
    pub demand: Kilowatts,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct Horizon {
    pub slots: Vec<HorizonSlot>,
}

impl Horizon {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let horizon = if path.extension().is_some_and(|extension| extension == "toml") {
            toml::from_str(&contents)?
        } else {
            serde_json::from_str(&contents)?
        };
        Ok(horizon)
    }

    pub fn into_series(self) -> Result<(PriceSeries, DemandForecast)> {
        let prices = Series::try_from_points(
            self.slots.iter().map(|slot| Point::new(slot.time, slot.price)).collect(),
        )?;
        let demand = Series::try_from_points(
            self.slots.iter().map(|slot| Point::new(slot.time, slot.demand)).collect(),
        )?;
        Ok((prices, demand))
    }
}

pub fn load_schedule(path: &Path) -> Result<Schedule> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_horizon() {
        let horizon: Horizon = serde_json::from_str(
            r#"{
                "slots": [
                    {"time": "2026-03-14T00:00:00+01:00", "price": 0.25, "demand": 0.4},
                    {"time": "2026-03-14T01:00:00+01:00", "price": -0.02}
                ]
            }"#,
        )
        .unwrap();
        let (prices, demand) = horizon.into_series().unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices.get(1).value, KilowattHourRate(-0.02));
        // Demand defaults to zero when omitted:
        assert_eq!(demand.get(1).value, Kilowatts(0.0));
    }

    #[test]
    fn test_parse_toml_horizon() {
        let horizon: Horizon = toml::from_str(
            r#"
                [[slots]]
                time = "2026-03-14T00:00:00+01:00"
                price = 0.25
                demand = 0.4

                [[slots]]
                time = "2026-03-14T01:00:00+01:00"
                price = 0.30
            "#,
        )
        .unwrap();
        assert_eq!(horizon.slots.len(), 2);
        assert_eq!(horizon.slots[0].demand, Kilowatts(0.4));
    }
}
