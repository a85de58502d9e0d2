use chrono::{DateTime, Local, TimeDelta};

use crate::{
    engine::EngineError,
    quantity::{power::Kilowatts, rate::KilowattHourRate},
};

/// A time series point.
#[derive(
    Clone, Copy, Debug, PartialEq, derive_more::Constructor, serde::Deserialize, serde::Serialize,
)]
pub struct Point<V> {
    pub time: DateTime<Local>,
    pub value: V,
}

/// Day-ahead price curve.
pub type PriceSeries = Series<KilowattHourRate>;

/// Predicted net household load: positive is consumption, negative is
/// on-site production.
pub type DemandForecast = Series<Kilowatts>;

/// Ordered sequence with strictly increasing, uniformly spaced timestamps.
#[derive(Clone, Debug)]
pub struct Series<V> {
    points: Vec<Point<V>>,
    slot_duration: TimeDelta,
}

impl<V> Series<V> {
    /// The slot duration assumed when the series has a single point and no
    /// gap to derive it from.
    const DEFAULT_SLOT_DURATION: TimeDelta = TimeDelta::hours(1);

    pub fn try_from_points(points: Vec<Point<V>>) -> Result<Self, EngineError> {
        if points.is_empty() {
            return Err(EngineError::EmptyHorizon);
        }
        let slot_duration = match points.windows(2).next() {
            Some(pair) => pair[1].time - pair[0].time,
            None => Self::DEFAULT_SLOT_DURATION,
        };
        if slot_duration <= TimeDelta::zero() {
            return Err(EngineError::MisalignedSeries(format!(
                "timestamps must be strictly increasing, got {} after {}",
                points[1].time, points[0].time,
            )));
        }
        for pair in points.windows(2) {
            let gap = pair[1].time - pair[0].time;
            if gap != slot_duration {
                return Err(EngineError::MisalignedSeries(format!(
                    "non-uniform slot spacing at {}: {gap} (expected {slot_duration})",
                    pair[1].time,
                )));
            }
        }
        Ok(Self { points, slot_duration })
    }

    pub const fn slot_duration(&self) -> TimeDelta {
        self.slot_duration
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point<V>> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> &Point<V> {
        &self.points[index]
    }

    /// Zip with another series, requiring the timestamp sets to match 1:1.
    pub fn try_zip<'l, 'r, R>(
        &'l self,
        rhs: &'r Series<R>,
    ) -> Result<Vec<Point<(&'l V, &'r R)>>, EngineError> {
        if self.len() != rhs.len() {
            return Err(EngineError::MisalignedSeries(format!(
                "series lengths differ: {} vs {}",
                self.len(),
                rhs.len(),
            )));
        }
        self.points
            .iter()
            .zip(&rhs.points)
            .map(|(lhs, rhs)| {
                if lhs.time == rhs.time {
                    Ok(Point::new(lhs.time, (&lhs.value, &rhs.value)))
                } else {
                    Err(EngineError::MisalignedSeries(format!(
                        "timestamps differ: {} vs {}",
                        lhs.time, rhs.time,
                    )))
                }
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub fn hourly<V: Copy>(values: &[V]) -> Series<V> {
        let start = Local.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        Series::try_from_points(
            values
                .iter()
                .enumerate()
                .map(|(hour, value)| Point::new(start + TimeDelta::hours(hour as i64), *value))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_series() {
        assert!(matches!(
            Series::<KilowattHourRate>::try_from_points(Vec::new()),
            Err(EngineError::EmptyHorizon),
        ));
    }

    #[test]
    fn test_single_point_defaults_to_one_hour() {
        let series = hourly(&[KilowattHourRate(0.25)]);
        assert_eq!(series.slot_duration(), TimeDelta::hours(1));
    }

    #[test]
    fn test_non_uniform_spacing() {
        let start = Local.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        let result = Series::try_from_points(vec![
            Point::new(start, KilowattHourRate(0.1)),
            Point::new(start + TimeDelta::hours(1), KilowattHourRate(0.2)),
            Point::new(start + TimeDelta::minutes(90), KilowattHourRate(0.3)),
        ]);
        assert!(matches!(result, Err(EngineError::MisalignedSeries(_))));
    }

    #[test]
    fn test_decreasing_timestamps() {
        let start = Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let result = Series::try_from_points(vec![
            Point::new(start, KilowattHourRate(0.1)),
            Point::new(start - TimeDelta::hours(1), KilowattHourRate(0.2)),
        ]);
        assert!(matches!(result, Err(EngineError::MisalignedSeries(_))));
    }

    #[test]
    fn test_zip_aligned() {
        let prices = hourly(&[KilowattHourRate(0.1), KilowattHourRate(0.2)]);
        let demand = hourly(&[Kilowatts(1.0), Kilowatts(2.0)]);
        let zipped = prices.try_zip(&demand).unwrap();
        assert_eq!(zipped.len(), 2);
        assert_eq!(*zipped[1].value.1, Kilowatts(2.0));
    }

    #[test]
    fn test_zip_shifted_timestamps() {
        let prices = hourly(&[KilowattHourRate(0.1), KilowattHourRate(0.2)]);
        let start = Local.with_ymd_and_hms(2026, 3, 14, 6, 0, 0).unwrap();
        let demand = Series::try_from_points(vec![
            Point::new(start, Kilowatts(1.0)),
            Point::new(start + TimeDelta::hours(1), Kilowatts(2.0)),
        ])
        .unwrap();
        assert!(matches!(prices.try_zip(&demand), Err(EngineError::MisalignedSeries(_))));
    }

    #[test]
    fn test_zip_length_mismatch() {
        let prices = hourly(&[KilowattHourRate(0.1), KilowattHourRate(0.2)]);
        let demand = hourly(&[Kilowatts(1.0)]);
        assert!(matches!(prices.try_zip(&demand), Err(EngineError::MisalignedSeries(_))));
    }
}
