/// What the planner optimizes for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Objective {
    /// Minimize the total grid cost; discharging may export beyond the
    /// household demand at the spot rate.
    #[default]
    MinimizeCost,

    /// Never export: discharging is capped at the slot's consumption.
    MaximizeSelfSufficiency,
}

/// Explicit planner knobs. There are no implicit defaults beyond what the
/// `Default` impls spell out.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimizerConfig {
    pub objective: Objective,

    /// Reserve enough slots to bring the final SoC back to the initial SoC.
    pub return_to_initial_soc: bool,

    /// Cap on battery-side charge throughput, expressed in equivalent full
    /// cycles over the horizon.
    pub max_cycles_per_horizon: Option<f64>,
}
