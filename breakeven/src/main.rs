use anyhow::Context;
use clap::Parser;
use cost_breakeven::model::CostModel;
use cost_breakeven::presets::{preset, preset_names};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about, long_about = None)]
struct BreakevenCli {
    /// The bundled cost models to evaluate, defaults to all of them
    #[clap(long)]
    model: Vec<String>,

    /// Evaluate a cost model from a TOML file, can be given multiple times
    #[clap(long)]
    model_file: Vec<PathBuf>,

    /// Directory to write the charts and break-even files to
    #[clap(long, default_value = ".")]
    out_dir: PathBuf,

    /// Only write the break-even files
    #[clap(long, default_value = "false")]
    no_charts: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = BreakevenCli::parse();

    let mut models = Vec::new();
    for path in &cli.model_file {
        models.push(
            CostModel::from_toml_file(path)
                .with_context(|| format!("Failed to load cost model {}", path.display()))?,
        );
    }
    let names = if cli.model.is_empty() && cli.model_file.is_empty() {
        preset_names().map(String::from).collect()
    } else {
        cli.model.clone()
    };
    for name in &names {
        models.push(preset(name)?);
    }

    for model in &models {
        log::debug!("Evaluating {model:?}");
        let output = cost_breakeven::run(model, &cli.out_dir, !cli.no_charts)?;
        for breakeven in &output.report.breakevens {
            if let Some(annotation) = breakeven.annotation() {
                log::info!("{}: {annotation}", model.name);
            }
        }
    }

    Ok(())
}
