use chrono::{DateTime, Local};

use crate::{
    engine::{
        Action,
        BatteryProfile,
        DemandForecast,
        ENERGY_EPSILON,
        EngineError,
        FeasibilityModel,
        PriceSeries,
        Schedule,
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Realized cost of one slot.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct SlotCost {
    pub time: DateTime<Local>,

    /// Energy exchanged with the grid; negative is feed-in.
    pub grid_energy: KilowattHours,

    pub cost: Cost,

    /// What the slot would have cost without the battery.
    pub baseline_cost: Cost,
}

/// Aggregated replay outcome.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CostReport {
    pub total_cost: Cost,
    pub baseline_cost: Cost,
    pub savings: Cost,
    pub slots: Vec<SlotCost>,
}

/// Deterministic, independent replay of a schedule.
///
/// The replay re-derives every SoC transition from scratch and re-verifies
/// feasibility, so a schedule produced by a stale or buggy planner is caught
/// rather than priced.
pub struct CostEvaluator;

impl CostEvaluator {
    #[instrument(skip_all, fields(n_slots = schedule.len()))]
    pub fn evaluate(
        schedule: &Schedule,
        prices: &PriceSeries,
        demand: &DemandForecast,
        profile: BatteryProfile,
    ) -> Result<CostReport, EngineError> {
        let profile = profile.validate()?;
        let model = FeasibilityModel::new(profile);
        let duration = prices.slot_duration();
        let inputs = prices.try_zip(demand)?;
        if schedule.len() != inputs.len() {
            return Err(EngineError::InconsistentSchedule {
                time: inputs[0].time,
                reason: format!(
                    "schedule covers {} slots, the horizon has {}",
                    schedule.len(),
                    inputs.len(),
                ),
            });
        }

        let mut soc = profile.initial_soc;
        let mut total_cost = Cost::ZERO;
        let mut baseline_cost = Cost::ZERO;
        let mut slots = Vec::with_capacity(inputs.len());

        for (entry, input) in schedule.iter().zip(&inputs) {
            let (price, demand) = (*input.value.0, *input.value.1);
            if entry.time != input.time {
                return Err(EngineError::InconsistentSchedule {
                    time: input.time,
                    reason: format!("schedule entry is stamped {}", entry.time),
                });
            }
            let feasible =
                model.clamp_power(soc, entry.action, entry.power, duration);
            if (entry.power - feasible).0.abs() > ENERGY_EPSILON {
                return Err(EngineError::InconsistentSchedule {
                    time: entry.time,
                    reason: format!(
                        "{:?} at {} is not feasible, at most {feasible} is",
                        entry.action, entry.power,
                    ),
                });
            }
            soc = model
                .step(entry.time, soc, entry.action, entry.power, duration)
                .map_err(|_| EngineError::InconsistentSchedule {
                    time: entry.time,
                    reason: format!("{:?} at {} escapes the SoC bounds", entry.action, entry.power),
                })?;
            if (soc - entry.soc_after).abs() > KilowattHours(ENERGY_EPSILON) {
                return Err(EngineError::InconsistentSchedule {
                    time: entry.time,
                    reason: format!(
                        "recorded SoC {} does not replay, got {soc}",
                        entry.soc_after,
                    ),
                });
            }

            let battery_energy = entry.power * duration;
            let grid_energy = match entry.action {
                Action::Idle => demand * duration,
                Action::Charge => demand * duration + battery_energy,
                Action::Discharge => demand * duration - battery_energy,
            };
            let cost = grid_energy * price;
            let baseline = (demand * duration) * price;
            total_cost += cost;
            baseline_cost += baseline;
            slots.push(SlotCost { time: entry.time, grid_energy, cost, baseline_cost: baseline });
        }

        Ok(CostReport { total_cost, baseline_cost, savings: baseline_cost - total_cost, slots })
    }
}
