mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use anyhow::{Context, Result};
use app::HouseDashApp;
use config::DashboardConfig;
use data::filter::{FilterConstraints, filter};
use data::loader::DatasetCache;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env()?;
    if config.summary_only {
        return print_summary(&config);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "House Listings Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HouseDashApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}

/// Load, filter by the requested locations and print the KPI block.
fn print_summary(config: &DashboardConfig) -> Result<()> {
    let path = config
        .data_path
        .as_deref()
        .with_context(|| format!("--summary needs a file path or ${}", config::DATA_ENV))?;

    let dataset = DatasetCache::new().get_or_load(path)?;
    let mut constraints = FilterConstraints::unrestricted(&dataset);
    constraints.locations.extend(config.locations.iter().cloned());

    for location in &constraints.locations {
        if !dataset.locations.contains(location) {
            log::warn!("Location '{location}' does not appear in {}", path.display());
        }
    }

    let subset = filter(&dataset.records, &constraints);
    let kpis = data::stats::kpis(&subset);
    println!("{}", view::kpi_report(&kpis));
    Ok(())
}
