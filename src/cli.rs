use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    engine::{BatteryProfile, Objective, OptimizerConfig},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plan a charge/discharge schedule over a price horizon and report the
    /// expected savings.
    Plan(Box<PlanArgs>),

    /// Replay a stored schedule against a price horizon and report the
    /// realized cost.
    Evaluate(Box<EvaluateArgs>),
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Horizon file with per-slot prices and predicted net load (JSON or TOML).
    #[clap(long, env = "HORIZON_PATH")]
    pub horizon: PathBuf,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub optimizer: OptimizerArgs,

    /// Emit the schedule and the cost report as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct EvaluateArgs {
    /// Horizon file with per-slot prices and predicted net load (JSON or TOML).
    #[clap(long, env = "HORIZON_PATH")]
    pub horizon: PathBuf,

    /// Schedule file produced by `plan --json`.
    #[clap(long)]
    pub schedule: PathBuf,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    /// Emit the cost report as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "capacity-kwh", env = "CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Maximum charging power in kilowatts.
    #[clap(long = "max-charge-kw", env = "MAX_CHARGE_KW")]
    pub max_charge_power: Kilowatts,

    /// Maximum discharging power in kilowatts.
    #[clap(long = "max-discharge-kw", env = "MAX_DISCHARGE_KW")]
    pub max_discharge_power: Kilowatts,

    /// Fraction of energy recovered after a full cycle, in (0, 1].
    #[clap(long, default_value = "0.9", env = "ROUND_TRIP_EFFICIENCY")]
    pub round_trip_efficiency: f64,

    /// Minimal state of charge in kilowatt-hours.
    #[clap(long = "min-soc-kwh", default_value = "0", env = "MIN_SOC_KWH")]
    pub min_soc: KilowattHours,

    /// Maximal state of charge in kilowatt-hours.
    #[clap(long = "max-soc-kwh", env = "MAX_SOC_KWH")]
    pub max_soc: KilowattHours,

    /// State of charge at the start of the horizon, in kilowatt-hours.
    #[clap(long = "initial-soc-kwh", env = "INITIAL_SOC_KWH")]
    pub initial_soc: KilowattHours,
}

impl From<BatteryArgs> for BatteryProfile {
    fn from(args: BatteryArgs) -> Self {
        Self::builder()
            .capacity(args.capacity)
            .max_charge_power(args.max_charge_power)
            .max_discharge_power(args.max_discharge_power)
            .round_trip_efficiency(args.round_trip_efficiency)
            .min_soc(args.min_soc)
            .max_soc(args.max_soc)
            .initial_soc(args.initial_soc)
            .build()
    }
}

#[derive(Copy, Clone, Parser)]
pub struct OptimizerArgs {
    #[clap(long, value_enum, default_value = "minimize-cost", env = "OBJECTIVE")]
    pub objective: Objective,

    /// Bring the battery back to its initial state of charge by the end of
    /// the horizon.
    #[clap(long, env = "RETURN_TO_INITIAL_SOC")]
    pub return_to_initial_soc: bool,

    /// Cap on charge throughput in equivalent full cycles over the horizon.
    #[clap(long, env = "MAX_CYCLES_PER_HORIZON")]
    pub max_cycles_per_horizon: Option<f64>,
}

impl From<OptimizerArgs> for OptimizerConfig {
    fn from(args: OptimizerArgs) -> Self {
        Self {
            objective: args.objective,
            return_to_initial_soc: args.return_to_initial_soc,
            max_cycles_per_horizon: args.max_cycles_per_horizon,
        }
    }
}
