use chrono::{DateTime, Local};

use crate::{
    engine::Action,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// One planned slot.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ScheduleEntry {
    pub time: DateTime<Local>,
    pub action: Action,

    /// Grid-side power, always non-negative; the direction is the action.
    pub power: Kilowatts,

    /// SoC at the end of the slot.
    pub soc_after: KilowattHours,
}

/// Complete plan: one entry per input slot, in input order.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Schedule(pub Vec<ScheduleEntry>);

impl Schedule {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.0.iter()
    }

    pub fn trace(&self) {
        for entry in &self.0 {
            debug!(
                time = %entry.time.format("%d %H:%M"),
                action = ?entry.action,
                power = %entry.power,
                soc_after = %entry.soc_after,
                "plotted",
            );
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;
    type Item = &'a ScheduleEntry;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
