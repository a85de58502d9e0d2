mod battery;
mod config;
mod error;
mod evaluator;
mod optimizer;
mod profile;
mod schedule;
mod series;

pub use self::{
    battery::{Action, FeasibilityModel},
    config::{Objective, OptimizerConfig},
    error::EngineError,
    evaluator::{CostEvaluator, CostReport, SlotCost},
    optimizer::Optimizer,
    profile::BatteryProfile,
    schedule::{Schedule, ScheduleEntry},
    series::{DemandForecast, Point, PriceSeries, Series},
};

/// SoC agreement tolerance between a recorded schedule and its replay.
pub(crate) const ENERGY_EPSILON: f64 = 1e-6;
