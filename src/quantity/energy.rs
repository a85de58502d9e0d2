use std::{
    fmt::{Display, Formatter},
    ops::{Div, Mul},
};

use chrono::TimeDelta;

use crate::quantity::{cost::Cost, power::Kilowatts, rate::KilowattHourRate};

/// Amount of energy in kilowatt-hours.
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
    derive_more::Sum,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct KilowattHours(pub f64);

impl KilowattHours {
    pub const ZERO: Self = Self(0.0);

    pub fn min(self, rhs: Self) -> Self {
        if rhs < self { rhs } else { self }
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs > self { rhs } else { self }
    }

    pub fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Mul<f64> for KilowattHours {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for KilowattHours {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Cost {
        Cost(self.0 * rhs.0)
    }
}

impl Div<TimeDelta> for KilowattHours {
    type Output = Kilowatts;

    fn div(self, rhs: TimeDelta) -> Kilowatts {
        Kilowatts(self.0 / (rhs.as_seconds_f64() / 3600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_clamp() {
        assert_eq!(KilowattHours(1.0).min(KilowattHours(2.0)), KilowattHours(1.0));
        assert_eq!(KilowattHours(1.0).max(KilowattHours(2.0)), KilowattHours(2.0));
        assert_eq!(
            KilowattHours(4.0).clamp(KilowattHours(1.0), KilowattHours(3.0)),
            KilowattHours(3.0),
        );
    }

    #[test]
    fn test_into_power() {
        assert_eq!(KilowattHours(2.5) / TimeDelta::minutes(30), Kilowatts(5.0));
    }

    #[test]
    fn test_into_cost() {
        assert_eq!(KilowattHours(4.0) * KilowattHourRate(0.25), Cost(1.0));
    }
}
