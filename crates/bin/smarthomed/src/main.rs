//! # smarthomed: smart home composition root
//!
//! Builds the home declared in the configuration file inside the
//! process-wide controller, runs the configured operations, and prints a
//! JSON report to stdout.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize `tracing` (logs go to stderr)
//! - Seed the controller with devices, rooms, users, and assignments
//! - Run the configured operations and report their outcomes
//!
//! ## Dependency rule
//! This is the **only** crate that depends on every other crate.
//! It is the wiring layer. No domain logic belongs here.

mod config;
mod seed;

use anyhow::Context;
use serde::Serialize;
use smarthome_app::SmartHomeController;
use smarthome_app::snapshot::HomeSnapshot;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::seed::OperationRecord;

#[derive(Serialize)]
struct Report<'a> {
    operations: &'a [OperationRecord],
    home: HomeSnapshot<'a>,
}

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let rendered = SmartHomeController::with_instance(|controller| {
        let seeded = seed::apply(controller, &config).context("failed to build the home")?;
        let report = Report {
            operations: &seeded.operations,
            home: controller.snapshot(),
        };
        let rendered = if config.output.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.context("failed to render report")
    })?;

    println!("{rendered}");
    Ok(())
}
