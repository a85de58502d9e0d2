use chrono::{DateTime, Local, TimeDelta};

use crate::{
    engine::{BatteryProfile, ENERGY_EPSILON, EngineError},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// What the battery does during one slot.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize,
)]
pub enum Action {
    /// Do not do anything.
    #[default]
    #[serde(rename = "I")]
    Idle,

    /// Store energy drawn from the grid (or on-site production).
    #[serde(rename = "C")]
    Charge,

    /// Deliver energy to the household or the grid.
    #[serde(rename = "D")]
    Discharge,
}

/// State transition law and physical limits.
///
/// Power is measured at the grid side; the round-trip loss is split as a
/// square root over the two legs (see [`BatteryProfile::leg_efficiency`]).
#[derive(Clone, Copy)]
pub struct FeasibilityModel {
    profile: BatteryProfile,
}

impl FeasibilityModel {
    pub const fn new(profile: BatteryProfile) -> Self {
        Self { profile }
    }

    /// Resulting SoC after running `action` at `power` for `duration`.
    ///
    /// Fails with [`EngineError::InfeasibleAction`] when the requested power
    /// is negative or the resulting SoC escapes the profile bounds. The
    /// optimizer always clamps first, so this is a defensive check.
    pub fn step(
        &self,
        time: DateTime<Local>,
        soc: KilowattHours,
        action: Action,
        power: Kilowatts,
        duration: TimeDelta,
    ) -> Result<KilowattHours, EngineError> {
        if power < Kilowatts::ZERO {
            return Err(EngineError::InfeasibleAction {
                time,
                reason: format!("negative power {power}"),
            });
        }
        let new_soc = match action {
            Action::Idle => soc,
            Action::Charge => soc + (power * duration) * self.profile.leg_efficiency(),
            Action::Discharge => soc - (power * duration) / self.profile.leg_efficiency(),
        };
        let epsilon = KilowattHours(ENERGY_EPSILON);
        if new_soc < self.profile.min_soc - epsilon || new_soc > self.profile.max_soc + epsilon {
            return Err(EngineError::InfeasibleAction {
                time,
                reason: format!(
                    "{action:?} at {power} leaves SoC {new_soc} outside [{}, {}]",
                    self.profile.min_soc, self.profile.max_soc,
                ),
            });
        }
        Ok(new_soc)
    }

    /// The largest power ≤ `requested` that keeps the resulting SoC within
    /// bounds and respects the charge/discharge power limit.
    pub fn clamp_power(
        &self,
        soc: KilowattHours,
        action: Action,
        requested: Kilowatts,
        duration: TimeDelta,
    ) -> Kilowatts {
        if requested <= Kilowatts::ZERO {
            return Kilowatts::ZERO;
        }
        let feasible = match action {
            Action::Idle => Kilowatts::ZERO,
            Action::Charge => {
                let headroom = (self.profile.max_soc - soc).max(KilowattHours::ZERO);
                let soc_limited = (headroom / self.profile.leg_efficiency()) / duration;
                requested.min(self.profile.max_charge_power).min(soc_limited)
            }
            Action::Discharge => {
                let above_floor = (soc - self.profile.min_soc).max(KilowattHours::ZERO);
                let soc_limited = (above_floor * self.profile.leg_efficiency()) / duration;
                requested.min(self.profile.max_discharge_power).min(soc_limited)
            }
        };
        feasible.max(Kilowatts::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::engine::profile::tests::household_profile;

    const ONE_HOUR: TimeDelta = TimeDelta::hours(1);

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_step_idle() {
        let model = FeasibilityModel::new(household_profile());
        let soc = model
            .step(noon(), KilowattHours(4.0), Action::Idle, Kilowatts::ZERO, ONE_HOUR)
            .unwrap();
        assert_eq!(soc, KilowattHours(4.0));
    }

    #[test]
    fn test_step_charge_with_losses() {
        let profile = BatteryProfile { round_trip_efficiency: 0.81, ..household_profile() };
        let model = FeasibilityModel::new(profile);
        let soc = model
            .step(noon(), KilowattHours(0.0), Action::Charge, Kilowatts(2.0), ONE_HOUR)
            .unwrap();
        // 2 kWh drawn from the grid, 2 · 0.9 stored:
        assert_abs_diff_eq!(soc.0, 1.8, epsilon = 1e-9);
    }

    #[test]
    fn test_step_discharge_with_losses() {
        let profile = BatteryProfile {
            round_trip_efficiency: 0.81,
            initial_soc: KilowattHours(5.0),
            ..household_profile()
        };
        let model = FeasibilityModel::new(profile);
        let soc = model
            .step(noon(), KilowattHours(5.0), Action::Discharge, Kilowatts(1.8), ONE_HOUR)
            .unwrap();
        // Delivering 1.8 kWh drains 1.8 / 0.9 = 2 kWh:
        assert_abs_diff_eq!(soc.0, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_step_rejects_negative_power() {
        let model = FeasibilityModel::new(household_profile());
        let result =
            model.step(noon(), KilowattHours(4.0), Action::Charge, Kilowatts(-1.0), ONE_HOUR);
        assert!(matches!(result, Err(EngineError::InfeasibleAction { .. })));
    }

    #[test]
    fn test_step_rejects_overflow() {
        let model = FeasibilityModel::new(household_profile());
        let result =
            model.step(noon(), KilowattHours(9.0), Action::Charge, Kilowatts(5.0), ONE_HOUR);
        assert!(matches!(result, Err(EngineError::InfeasibleAction { .. })));
    }

    #[test]
    fn test_clamp_charge_by_headroom() {
        let model = FeasibilityModel::new(household_profile());
        let power =
            model.clamp_power(KilowattHours(8.0), Action::Charge, Kilowatts(5.0), ONE_HOUR);
        assert_eq!(power, Kilowatts(2.0));
    }

    #[test]
    fn test_clamp_charge_headroom_with_losses() {
        let profile = BatteryProfile { round_trip_efficiency: 0.25, ..household_profile() };
        let model = FeasibilityModel::new(profile);
        // 1 kWh of headroom absorbs 2 kWh from the grid at leg efficiency 0.5:
        let power =
            model.clamp_power(KilowattHours(9.0), Action::Charge, Kilowatts(5.0), ONE_HOUR);
        assert_abs_diff_eq!(power.0, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp_discharge_by_floor() {
        let profile = BatteryProfile { min_soc: KilowattHours(2.0), ..household_profile() };
        let model = FeasibilityModel::new(profile);
        let power =
            model.clamp_power(KilowattHours(3.5), Action::Discharge, Kilowatts(5.0), ONE_HOUR);
        assert_eq!(power, Kilowatts(1.5));
    }

    #[test]
    fn test_clamp_by_power_limit() {
        let model = FeasibilityModel::new(household_profile());
        let power =
            model.clamp_power(KilowattHours(0.0), Action::Charge, Kilowatts(50.0), ONE_HOUR);
        assert_eq!(power, Kilowatts(5.0));
    }

    #[test]
    fn test_clamp_idle_is_zero() {
        let model = FeasibilityModel::new(household_profile());
        let power =
            model.clamp_power(KilowattHours(5.0), Action::Idle, Kilowatts(5.0), ONE_HOUR);
        assert_eq!(power, Kilowatts::ZERO);
    }

    #[test]
    fn test_clamp_quarter_hour_slots() {
        let model = FeasibilityModel::new(household_profile());
        // 15-minute slot: the full 5 kW only moves 1.25 kWh, headroom allows it.
        let power = model.clamp_power(
            KilowattHours(9.0),
            Action::Charge,
            Kilowatts(5.0),
            TimeDelta::minutes(15),
        );
        assert_eq!(power, Kilowatts(4.0));
    }
}
