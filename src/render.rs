use comfy_table::{Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    engine::{Action, BatteryProfile, CostReport, PriceSeries, Schedule},
    quantity::cost::Cost,
};

/// Render the plan next to the prices and realized per-slot costs.
pub fn build_schedule_table(
    schedule: &Schedule,
    prices: &PriceSeries,
    report: &CostReport,
    profile: BatteryProfile,
) -> Table {
    let median_rate = prices
        .iter()
        .map(|point| OrderedFloat(point.value.0))
        .sorted()
        .nth(prices.len() / 2)
        .map_or(0.0, |rate| rate.0);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Time", "Price", "Action", "Power", "SoC", "Grid", "Cost"]);
    for ((entry, point), slot) in schedule.iter().zip(prices.iter()).zip(&report.slots) {
        table.add_row(vec![
            Cell::new(entry.time.format("%d %H:%M")),
            Cell::new(point.value).fg(if point.value.0 >= median_rate {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(format!("{:?}", entry.action)).fg(match entry.action {
                Action::Charge => Color::Green,
                Action::Discharge => Color::Red,
                Action::Idle => Color::Reset,
            }),
            Cell::new(entry.power).set_alignment(CellAlignment::Right),
            Cell::new(entry.soc_after).set_alignment(CellAlignment::Right).fg(
                if entry.soc_after > profile.min_soc { Color::Reset } else { Color::DarkYellow },
            ),
            Cell::new(slot.grid_energy).set_alignment(CellAlignment::Right),
            Cell::new(slot.cost.round_to_mills())
                .set_alignment(CellAlignment::Right)
                .fg(if slot.cost >= Cost::ZERO { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_report_table(report: &CostReport) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Baseline", "Planned", "Savings"]);
    table.add_row(vec![
        Cell::new(report.baseline_cost.round_to_mills()),
        Cell::new(report.total_cost.round_to_mills()),
        Cell::new(report.savings.round_to_mills()).fg(if report.savings >= Cost::ZERO {
            Color::Green
        } else {
            Color::Red
        }),
    ]);
    table
}
