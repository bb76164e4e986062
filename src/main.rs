use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fnstack::{package, synth, ExampleStack};
use fnstack_config::StackConfig;
use fnstack_constructs::EsbuildBundler;
use std::path::PathBuf;
use tracing::info;

/// Declare, synthesize and package Lambda function stacks
#[derive(Parser)]
#[command(name = "fnstack")]
#[command(version)]
#[command(about = "Declare, synthesize and package Lambda function stacks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output directory for the template, asset manifest and zips
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build layers and write template.json and assets.json
    Synth,
    /// Build and zip every asset listed in assets.json
    Package,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        StackConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        StackConfig::load().context("Failed to load configuration")?
    };
    apply_cli_overrides(&mut config, &cli);

    fnstack::init_tracing(&config.logging);

    match cli.command {
        Commands::Synth => run_synth(&config),
        Commands::Package => run_package(&config),
    }
}

fn apply_cli_overrides(config: &mut StackConfig, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.dir = output.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

fn run_synth(config: &StackConfig) -> Result<()> {
    info!(
        stack = %config.stack.name,
        region = %config.stack.region,
        build_mode = %config.build_mode,
        "synthesizing"
    );
    let bundler = EsbuildBundler::new(&config.layers.esbuild);
    let example = ExampleStack::build(config, &bundler).context("Failed to build stack")?;
    let template = example.stack.synth().context("Failed to synthesize template")?;

    let assembly = synth::write_assembly(&config.output.dir, &template, example.stack.assets())?;
    info!(template = %assembly.template.display(), "synth complete");
    Ok(())
}

fn run_package(config: &StackConfig) -> Result<()> {
    let assets = synth::read_assets(&config.output.dir)?;
    let zips = package::package_assets(&assets, &config.output.dir)?;
    info!(count = zips.len(), dir = %config.output.dir.display(), "package complete");
    Ok(())
}
