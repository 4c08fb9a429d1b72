//! Compare the monthly cost of a serverless function with always-on virtual machines and find the
//! request rate where one becomes cheaper than the other.

pub mod chart;
pub mod model;
pub mod presets;
pub mod solver;

use anyhow::Context;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Files written for one cost model.
#[derive(Debug, Clone)]
pub struct BreakevenOutput {
    pub report: solver::BreakevenReport,
    pub chart: Option<PathBuf>,
    pub json: PathBuf,
}

/// Solve the model and write `<name>_breakeven.json` and, optionally, `<name>_cost_comparison.png`.
pub fn run(
    model: &model::CostModel,
    out_dir: &Path,
    draw_chart: bool,
) -> anyhow::Result<BreakevenOutput> {
    let report = solver::solve(model);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Cannot create output directory {}", out_dir.display()))?;

    let json = out_dir.join(format!("{}_breakeven.json", model.name));
    serde_json::to_writer_pretty(
        File::create(&json).with_context(|| format!("Cannot create {}", json.display()))?,
        &report,
    )?;
    log::info!("Wrote {}", json.display());

    let chart = if draw_chart {
        let path = out_dir.join(format!("{}_cost_comparison.png", model.name));
        chart::draw_cost_chart(&path, model, &chart::cost_curves(model), &report)
            .with_context(|| format!("Cost comparison chart for {}", model.name))?;
        log::info!("Wrote {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(BreakevenOutput {
        report,
        chart,
        json,
    })
}
