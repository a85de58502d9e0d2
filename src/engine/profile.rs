use bon::Builder;

use crate::{
    engine::EngineError,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// Physical battery parameters. Immutable for the duration of a planning call.
#[derive(Builder, Clone, Copy, Debug, serde::Deserialize, serde::Serialize)]
pub struct BatteryProfile {
    pub capacity: KilowattHours,
    pub max_charge_power: Kilowatts,
    pub max_discharge_power: Kilowatts,

    /// Fraction of energy recovered after one full charge-discharge cycle.
    pub round_trip_efficiency: f64,

    pub min_soc: KilowattHours,
    pub max_soc: KilowattHours,
    pub initial_soc: KilowattHours,
}

impl BatteryProfile {
    /// Check the internal ordering of the bounds.
    pub fn validate(self) -> Result<Self, EngineError> {
        if !(self.capacity > KilowattHours::ZERO) {
            return Err(EngineError::InvalidProfile(format!(
                "capacity must be positive, got {}",
                self.capacity,
            )));
        }
        if !(self.max_charge_power >= Kilowatts::ZERO)
            || !(self.max_discharge_power >= Kilowatts::ZERO)
        {
            return Err(EngineError::InvalidProfile(format!(
                "power limits must be non-negative, got {} / {}",
                self.max_charge_power, self.max_discharge_power,
            )));
        }
        if !(self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0) {
            return Err(EngineError::InvalidProfile(format!(
                "round-trip efficiency must be in (0, 1], got {}",
                self.round_trip_efficiency,
            )));
        }
        if !(KilowattHours::ZERO <= self.min_soc
            && self.min_soc <= self.max_soc
            && self.max_soc <= self.capacity)
        {
            return Err(EngineError::InvalidProfile(format!(
                "SoC bounds must satisfy 0 ≤ {} ≤ {} ≤ {}",
                self.min_soc, self.max_soc, self.capacity,
            )));
        }
        if !(self.min_soc <= self.initial_soc && self.initial_soc <= self.max_soc) {
            return Err(EngineError::InvalidProfile(format!(
                "initial SoC {} is outside [{}, {}]",
                self.initial_soc, self.min_soc, self.max_soc,
            )));
        }
        Ok(self)
    }

    /// Efficiency applied once per leg: the round-trip loss is split as a
    /// square root over the charge and discharge legs, so a full cycle
    /// recovers exactly `round_trip_efficiency`.
    pub fn leg_efficiency(self) -> f64 {
        self.round_trip_efficiency.sqrt()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn household_profile() -> BatteryProfile {
        BatteryProfile::builder()
            .capacity(KilowattHours(10.0))
            .max_charge_power(Kilowatts(5.0))
            .max_discharge_power(Kilowatts(5.0))
            .round_trip_efficiency(1.0)
            .min_soc(KilowattHours(0.0))
            .max_soc(KilowattHours(10.0))
            .initial_soc(KilowattHours(0.0))
            .build()
    }

    #[test]
    fn test_valid_profile() {
        assert!(household_profile().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let profile =
            BatteryProfile { capacity: KilowattHours::ZERO, ..household_profile() };
        assert!(matches!(profile.validate(), Err(EngineError::InvalidProfile(_))));
    }

    #[test]
    fn test_swapped_soc_bounds() {
        let profile = BatteryProfile {
            min_soc: KilowattHours(8.0),
            max_soc: KilowattHours(2.0),
            initial_soc: KilowattHours(5.0),
            ..household_profile()
        };
        assert!(matches!(profile.validate(), Err(EngineError::InvalidProfile(_))));
    }

    #[test]
    fn test_initial_soc_outside_bounds() {
        let profile =
            BatteryProfile { initial_soc: KilowattHours(11.0), ..household_profile() };
        assert!(matches!(profile.validate(), Err(EngineError::InvalidProfile(_))));
    }

    #[test]
    fn test_efficiency_out_of_range() {
        let profile =
            BatteryProfile { round_trip_efficiency: 1.2, ..household_profile() };
        assert!(matches!(profile.validate(), Err(EngineError::InvalidProfile(_))));
    }

    #[test]
    fn test_leg_efficiency_squares_to_round_trip() {
        let profile =
            BatteryProfile { round_trip_efficiency: 0.81, ..household_profile() };
        approx::assert_abs_diff_eq!(
            profile.leg_efficiency() * profile.leg_efficiency(),
            0.81,
            epsilon = 1e-12,
        );
    }
}
