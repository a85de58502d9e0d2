use chrono::{DateTime, Local};

/// Planning and evaluation failures. All are raised synchronously at the
/// point of detection; the engine never returns a partial schedule.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid battery profile: {0}")]
    InvalidProfile(String),

    #[error("price and demand series are misaligned: {0}")]
    MisalignedSeries(String),

    #[error("the planning horizon contains no slots")]
    EmptyHorizon,

    #[error("infeasible action at {time}: {reason}")]
    InfeasibleAction { time: DateTime<Local>, reason: String },

    #[error("inconsistent schedule at {time}: {reason}")]
    InconsistentSchedule { time: DateTime<Local>, reason: String },
}
