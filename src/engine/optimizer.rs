use bon::Builder;
use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    engine::{
        Action,
        BatteryProfile,
        DemandForecast,
        EngineError,
        FeasibilityModel,
        Objective,
        OptimizerConfig,
        PriceSeries,
        Schedule,
        ScheduleEntry,
    },
    prelude::*,
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
    },
};

/// Strictness margin for cost comparisons.
const COST_EPSILON: f64 = 1e-9;

/// Terminal SoC tolerance for `return_to_initial_soc`.
const SOC_TOLERANCE: KilowattHours = KilowattHours(1e-3);

/// Greedy paired-arbitrage planner.
///
/// Discharge candidates are visited in price-descending order; each one is
/// covered by the cheapest still-idle profitable charge slots. Every
/// tentative assignment is scored by simulating the whole horizon
/// sequentially and is kept only when the total cost strictly improves.
#[derive(Builder)]
pub struct Optimizer<'a> {
    prices: &'a PriceSeries,
    demand: &'a DemandForecast,
    profile: BatteryProfile,
    config: OptimizerConfig,
}

impl Optimizer<'_> {
    #[instrument(skip_all, fields(n_slots = self.prices.len()))]
    pub fn plan(self) -> Result<Schedule, EngineError> {
        let profile = self.profile.validate()?;
        if self.prices.is_empty() {
            return Err(EngineError::EmptyHorizon);
        }
        let inputs: Vec<SlotInput> = self
            .prices
            .try_zip(self.demand)?
            .into_iter()
            .map(|point| SlotInput {
                time: point.time,
                price: *point.value.0,
                demand: *point.value.1,
            })
            .collect();
        let mut search = Search {
            duration: self.prices.slot_duration(),
            model: FeasibilityModel::new(profile),
            profile,
            config: self.config,
            assignments: vec![Assignment::IDLE; inputs.len()],
            inputs,
        };
        search.run()?;
        if self.config.return_to_initial_soc {
            search.correct_terminal_soc()?;
        }
        let simulation = search.simulate()?;
        info!(cost = %simulation.cost.round_to_mills(), "optimized");
        Ok(Schedule(simulation.entries))
    }
}

#[derive(Clone, Copy)]
struct SlotInput {
    time: DateTime<Local>,
    price: KilowattHourRate,
    demand: Kilowatts,
}

#[derive(Clone, Copy, PartialEq)]
struct Assignment {
    action: Action,
    requested: Kilowatts,
}

impl Assignment {
    const IDLE: Self = Self { action: Action::Idle, requested: Kilowatts::ZERO };
}

struct Simulation {
    cost: Cost,
    final_soc: KilowattHours,

    /// Battery-side charge throughput over the horizon.
    charged: KilowattHours,

    entries: Vec<ScheduleEntry>,
}

struct Search {
    inputs: Vec<SlotInput>,
    duration: TimeDelta,
    model: FeasibilityModel,
    profile: BatteryProfile,
    config: OptimizerConfig,
    assignments: Vec<Assignment>,
}

impl Search {
    fn run(&mut self) -> Result<(), EngineError> {
        // Cheapest first, earlier slot wins a price tie:
        let charge_order: Vec<usize> = (0..self.inputs.len())
            .sorted_by_key(|&index| (OrderedFloat(self.inputs[index].price.0), index))
            .collect();
        // Most expensive first, later slot wins a price tie:
        let discharge_order: Vec<usize> = (0..self.inputs.len())
            .sorted_by(|&lhs, &rhs| {
                OrderedFloat(self.inputs[rhs].price.0)
                    .cmp(&OrderedFloat(self.inputs[lhs].price.0))
                    .then(rhs.cmp(&lhs))
            })
            .collect();

        let duration_hours = self.duration.as_seconds_f64() / 3600.0;
        let mut best_cost = self.effective_cost(&self.simulate()?);
        let mut charge_exhausted = false;

        for &discharge_index in &discharge_order {
            if self.assignments[discharge_index].action != Action::Idle {
                continue;
            }
            let requested = self.discharge_request(discharge_index);
            if requested <= Kilowatts::ZERO {
                continue;
            }

            let mut group = vec![discharge_index];
            self.assignments[discharge_index] =
                Assignment { action: Action::Discharge, requested };
            let mut group_simulation = self.simulate()?;
            let mut group_cost = self.effective_cost(&group_simulation);

            for &charge_index in &charge_order {
                if charge_exhausted {
                    break;
                }
                if self.assignments[charge_index].action != Action::Idle {
                    continue;
                }
                if !self.is_profitable_pair(charge_index, discharge_index) {
                    // Charge candidates only get more expensive from here:
                    break;
                }
                // Size the purchase to what the assigned discharges still
                // lack, so no bought energy is left stranded:
                let shortfall = self.discharge_shortfall(&group_simulation);
                if shortfall <= KilowattHours::ZERO {
                    break;
                }
                let requested = Kilowatts(
                    shortfall.0 / (self.profile.round_trip_efficiency * duration_hours),
                )
                .min(self.profile.max_charge_power);
                self.assignments[charge_index] =
                    Assignment { action: Action::Charge, requested };
                let candidate = self.simulate()?;
                if self.exceeds_cycle_cap(&candidate) {
                    self.assignments[charge_index] = Assignment::IDLE;
                    charge_exhausted = true;
                    break;
                }
                let candidate_cost = self.effective_cost(&candidate);
                if candidate_cost + COST_EPSILON < group_cost {
                    group_cost = candidate_cost;
                    group_simulation = candidate;
                    group.push(charge_index);
                } else {
                    // A charge slot after the discharge cannot feed it; keep
                    // scanning, a pricier slot before it may still pay:
                    self.assignments[charge_index] = Assignment::IDLE;
                }
            }

            if group_cost + COST_EPSILON < best_cost {
                best_cost = group_cost;
            } else {
                for index in group {
                    self.assignments[index] = Assignment::IDLE;
                }
            }
        }

        // Negative feed-in prices pay for charging even with no discharge to
        // feed afterwards:
        for &index in &charge_order {
            if charge_exhausted {
                break;
            }
            if self.inputs[index].price.0 >= 0.0 {
                break;
            }
            if self.assignments[index].action != Action::Idle {
                continue;
            }
            self.assignments[index] = Assignment {
                action: Action::Charge,
                requested: self.profile.max_charge_power,
            };
            let candidate = self.simulate()?;
            if self.exceeds_cycle_cap(&candidate) {
                self.assignments[index] = Assignment::IDLE;
                charge_exhausted = true;
                break;
            }
            let candidate_cost = self.effective_cost(&candidate);
            if candidate_cost + COST_EPSILON < best_cost {
                best_cost = candidate_cost;
            } else {
                self.assignments[index] = Assignment::IDLE;
            }
        }
        Ok(())
    }

    /// Delivered energy the assigned discharges are still missing against
    /// their requests, per the latest simulation.
    fn discharge_shortfall(&self, simulation: &Simulation) -> KilowattHours {
        self.assignments
            .iter()
            .zip(&simulation.entries)
            .filter(|(assignment, _)| assignment.action == Action::Discharge)
            .map(|(assignment, entry)| (assignment.requested - entry.power) * self.duration)
            .sum()
    }

    /// Deterministic replay of the current assignments with sequential SoC
    /// clamping.
    fn simulate(&self) -> Result<Simulation, EngineError> {
        let mut soc = self.profile.initial_soc;
        let mut cost = Cost::ZERO;
        let mut charged = KilowattHours::ZERO;
        let mut entries = Vec::with_capacity(self.inputs.len());

        for (input, assignment) in self.inputs.iter().zip(&self.assignments) {
            let power =
                self.model.clamp_power(soc, assignment.action, assignment.requested, self.duration);
            // A fully clamped slot is indistinguishable from an idle one:
            let action =
                if power > Kilowatts::ZERO { assignment.action } else { Action::Idle };
            soc = self.model.step(input.time, soc, action, power, self.duration)?;

            let battery_energy = power * self.duration;
            let grid_energy = match action {
                Action::Idle => input.demand * self.duration,
                Action::Charge => {
                    charged += battery_energy * self.profile.leg_efficiency();
                    input.demand * self.duration + battery_energy
                }
                Action::Discharge => input.demand * self.duration - battery_energy,
            };
            cost += grid_energy * input.price;
            entries.push(ScheduleEntry { time: input.time, action, power, soc_after: soc });
        }

        Ok(Simulation { cost, final_soc: soc, charged, entries })
    }

    /// Cost used for accept/reject comparisons. With `return_to_initial_soc`
    /// set, a terminal deviation is priced at the best still-idle slot, so
    /// the search does not strand or hoard energy it will have to correct.
    fn effective_cost(&self, simulation: &Simulation) -> f64 {
        simulation.cost.0 + self.terminal_penalty(simulation)
    }

    fn terminal_penalty(&self, simulation: &Simulation) -> f64 {
        if !self.config.return_to_initial_soc {
            return 0.0;
        }
        let deviation = self.profile.initial_soc - simulation.final_soc;
        if deviation > SOC_TOLERANCE {
            // Re-buying the deficit at the cheapest idle slot:
            match self.idle_prices().min_by_key(|price| OrderedFloat(price.0)) {
                Some(price) => deviation.0 / self.profile.leg_efficiency() * price.0,
                None => f64::INFINITY,
            }
        } else if deviation < -SOC_TOLERANCE {
            // Selling the excess at the most expensive idle slot:
            match self.idle_prices().max_by_key(|price| OrderedFloat(price.0)) {
                Some(price) => deviation.0 * self.profile.leg_efficiency() * price.0,
                None => f64::INFINITY,
            }
        } else {
            0.0
        }
    }

    fn idle_prices(&self) -> impl Iterator<Item = KilowattHourRate> {
        self.inputs
            .iter()
            .zip(&self.assignments)
            .filter(|(_, assignment)| assignment.action == Action::Idle)
            .map(|(input, _)| input.price)
    }

    /// Assign exactly-sized corrections on idle slots until the final SoC is
    /// back at the initial SoC, cheapest slots for top-ups and most expensive
    /// slots for bleed-downs.
    fn correct_terminal_soc(&mut self) -> Result<(), EngineError> {
        let duration_hours = self.duration.as_seconds_f64() / 3600.0;
        let last_time = self.inputs.last().map_or_else(Local::now, |input| input.time);

        for _ in 0..self.inputs.len() {
            let simulation = self.simulate()?;
            let deviation = self.profile.initial_soc - simulation.final_soc;
            if deviation.abs() <= SOC_TOLERANCE {
                return Ok(());
            }
            let slot = if deviation > KilowattHours::ZERO {
                self.idle_slots().min_by_key(|&index| {
                    (OrderedFloat(self.inputs[index].price.0), index)
                })
            } else {
                self.idle_slots().max_by_key(|&index| {
                    (OrderedFloat(self.inputs[index].price.0), index)
                })
            };
            let Some(index) = slot else { break };

            if deviation > KilowattHours::ZERO {
                let requested = Kilowatts(
                    deviation.0 / (self.profile.leg_efficiency() * duration_hours),
                )
                .min(self.profile.max_charge_power);
                let projected = simulation.charged + deviation;
                if let Some(max_cycles) = self.config.max_cycles_per_horizon
                    && projected.0 > max_cycles * self.profile.capacity.0 + COST_EPSILON
                {
                    return Err(EngineError::InfeasibleAction {
                        time: last_time,
                        reason: "returning to the initial SoC exceeds the cycle cap".to_string(),
                    });
                }
                self.assignments[index] =
                    Assignment { action: Action::Charge, requested };
            } else {
                let deliverable = -deviation * self.profile.leg_efficiency();
                let requested = (deliverable / self.duration).min(self.discharge_request(index));
                if requested <= Kilowatts::ZERO {
                    break;
                }
                self.assignments[index] =
                    Assignment { action: Action::Discharge, requested };
            }
        }

        let simulation = self.simulate()?;
        let deviation = self.profile.initial_soc - simulation.final_soc;
        if deviation.abs() <= SOC_TOLERANCE {
            Ok(())
        } else {
            Err(EngineError::InfeasibleAction {
                time: last_time,
                reason: format!(
                    "the horizon cannot absorb the terminal SoC correction of {deviation}",
                ),
            })
        }
    }

    fn idle_slots(&self) -> impl Iterator<Item = usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, assignment)| assignment.action == Action::Idle)
            .map(|(index, _)| index)
    }

    /// How much discharge power may be requested at a slot under the
    /// configured objective.
    fn discharge_request(&self, index: usize) -> Kilowatts {
        match self.config.objective {
            Objective::MinimizeCost => self.profile.max_discharge_power,
            Objective::MaximizeSelfSufficiency => self
                .profile
                .max_discharge_power
                .min(self.inputs[index].demand.max(Kilowatts::ZERO)),
        }
    }

    /// A discharge pays for a charge when the sell rate beats the buy rate
    /// corrected for the round-trip loss. Holds for negative prices too.
    fn is_profitable_pair(&self, charge_index: usize, discharge_index: usize) -> bool {
        self.inputs[discharge_index].price.0
            > self.inputs[charge_index].price.0 / self.profile.round_trip_efficiency
    }

    fn exceeds_cycle_cap(&self, simulation: &Simulation) -> bool {
        self.config.max_cycles_per_horizon.is_some_and(|max_cycles| {
            simulation.charged.0 > max_cycles * self.profile.capacity.0 + COST_EPSILON
        })
    }
}
