mod cli;
mod engine;
mod input;
mod prelude;
mod quantity;
mod render;

use clap::Parser;

use crate::{
    cli::{Args, Command},
    engine::{CostEvaluator, Optimizer},
    input::Horizon,
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    match Args::parse().command {
        Command::Plan(args) => {
            let (prices, demand) = Horizon::load(&args.horizon)?.into_series()?;
            info!(n_slots = prices.len(), "loaded the horizon");

            let profile = args.battery.into();
            let schedule = Optimizer::builder()
                .prices(&prices)
                .demand(&demand)
                .profile(profile)
                .config(args.optimizer.into())
                .build()
                .plan()?;
            schedule.trace();
            let report = CostEvaluator::evaluate(&schedule, &prices, &demand, profile)?;
            info!(savings = %report.savings.round_to_mills(), "planned");

            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "schedule": schedule, "report": report }),
                );
            } else {
                println!("{}", render::build_schedule_table(&schedule, &prices, &report, profile));
                println!("{}", render::build_report_table(&report));
            }
            Ok(())
        }

        Command::Evaluate(args) => {
            let (prices, demand) = Horizon::load(&args.horizon)?.into_series()?;
            let schedule = input::load_schedule(&args.schedule)?;
            let profile = args.battery.into();
            let report = CostEvaluator::evaluate(&schedule, &prices, &demand, profile)?;
            info!(savings = %report.savings.round_to_mills(), "evaluated");

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::build_schedule_table(&schedule, &prices, &report, profile));
                println!("{}", render::build_report_table(&report));
            }
            Ok(())
        }
    }
}
