//! `cvdsim` - simulate color-vision deficiencies on images.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cvdsim_core::{
    Condition, FigureLayout, SimulationSession, SimulatorConfig, TransformRegistry, save_image,
    write_figure,
};

/// Simulate how images look under common color-vision deficiencies.
#[derive(Parser, Debug)]
#[command(name = "cvdsim")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file with figure and preview settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the composite figure of every condition.
    Figure {
        /// Input image path.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output image path. Defaults to $CVDSIM_OUTPUT or the config value.
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Lay out only these conditions, packed row-major.
        #[arg(short, long = "condition", value_name = "NAME")]
        conditions: Vec<String>,

        /// Columns per row when conditions are given.
        #[arg(long, default_value = "4", value_name = "INT")]
        columns: usize,
    },

    /// Simulate selected conditions and write one image per condition.
    Simulate {
        /// Input image path.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Condition to simulate. Repeat for several.
        #[arg(short, long = "condition", value_name = "NAME", required = true)]
        conditions: Vec<String>,

        /// Directory for the results.
        #[arg(short = 'd', long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,

        /// Write result previews instead of full-size images.
        #[arg(long)]
        preview: bool,
    },

    /// List the built-in conditions and their transforms.
    List {
        /// Print the registry as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cvdsim={log_level},cvdsim_core={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SimulatorConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => SimulatorConfig::default(),
    };

    match &args.command {
        Command::Figure {
            input,
            output,
            conditions,
            columns,
        } => run_figure(config, input, output.as_deref(), conditions, *columns),
        Command::Simulate {
            input,
            conditions,
            out_dir,
            preview,
        } => run_simulate(config, input, conditions, out_dir, *preview),
        Command::List { json } => run_list(*json),
    }
}

fn parse_conditions(names: &[String]) -> Result<Vec<Condition>> {
    names
        .iter()
        .map(|name| name.parse::<Condition>().map_err(anyhow::Error::from))
        .collect()
}

fn run_figure(
    mut config: SimulatorConfig,
    input: &Path,
    output: Option<&Path>,
    conditions: &[String],
    columns: usize,
) -> Result<()> {
    if let Some(output) = output {
        config.output_path = output.to_path_buf();
    }
    let layout = if conditions.is_empty() {
        FigureLayout::standard()
    } else {
        FigureLayout::packed(&parse_conditions(conditions)?, columns)
    };

    write_figure(input, &layout, &config).context("Failed to render composite figure")?;

    println!("Saved output to {}", config.output_path.display());
    Ok(())
}

fn run_simulate(
    config: SimulatorConfig,
    input: &Path,
    conditions: &[String],
    out_dir: &Path,
    preview: bool,
) -> Result<()> {
    let conditions = parse_conditions(conditions)?;

    let mut session = SimulationSession::new(config);
    session
        .load(input)
        .with_context(|| format!("Failed to load image {}", input.display()))?;
    for condition in conditions {
        session.set_selected(condition, true);
    }
    session.simulate().context("Failed to simulate")?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    for (condition, path) in export_results(&session, &stem, out_dir, preview)? {
        println!("{condition} -> {}", path.display());
    }

    tracing::info!("{}", session.status());
    Ok(())
}

/// File-name form of a condition label: `Blue Cone Monochromacy` becomes
/// `blue_cone_monochromacy`.
fn condition_slug(condition: Condition) -> String {
    condition.label().to_lowercase().replace(' ', "_")
}

/// Write each session result to `<out_dir>/<stem>_<condition>.png`.
///
/// Full-size images by default, result previews when `preview` is set.
fn export_results(
    session: &SimulationSession,
    stem: &str,
    out_dir: &Path,
    preview: bool,
) -> Result<Vec<(Condition, PathBuf)>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(session.results().len());
    for result in session.results() {
        let path = out_dir.join(format!("{stem}_{}.png", condition_slug(result.condition)));
        let image = if preview { &result.preview } else { &result.image };
        save_image(image, &path)
            .with_context(|| format!("Failed to export {}", result.condition))?;
        written.push((result.condition, path));
    }
    Ok(written)
}

fn run_list(json: bool) -> Result<()> {
    let registry = TransformRegistry::builtin();

    if json {
        let entries: Vec<_> = registry
            .iter()
            .map(|(condition, transform)| {
                serde_json::json!({
                    "condition": condition,
                    "label": condition.label(),
                    "category": condition.category(),
                    "transform": transform,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (condition, transform) in registry.iter() {
        println!("{:<24} {}", condition.label(), condition.category().label());
        match transform.matrix() {
            Some(matrix) => {
                for row in matrix.rows() {
                    println!("    [{:>6.3} {:>6.3} {:>6.3}]", row[0], row[1], row[2]);
                }
            }
            None => println!("    grayscale"),
        }
    }
    Ok(())
}
