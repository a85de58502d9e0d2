use std::{
    fmt::{Display, Formatter},
    ops::Mul,
};

/// Euro per kilowatt-hour. May be negative on feed-in incentive hours.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct KilowattHourRate(pub f64);

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} €/kWh", self.0)
    }
}

impl Mul<f64> for KilowattHourRate {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}
