use anyhow::{bail, Context, Result};
use clap::Parser;
use png_squeeze::cli::{print_summary, print_tool_report};
use png_squeeze::strategy::ToolPaths;
use png_squeeze::{Config, Squeezer, StrategyKind};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "png-squeeze")]
#[command(about = "Shrink a PNG losslessly by racing several optimizers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct PngSqueezeCli {
    /// PNG file to optimize
    input: Option<PathBuf>,

    /// Write the result here instead of replacing the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing the bundled optimizer binaries
    #[arg(long)]
    tools_dir: Option<PathBuf>,

    /// Only run these strategies (repeatable)
    #[arg(short, long = "strategy")]
    strategies: Vec<StrategyKind>,

    /// Run strategies one after another
    #[arg(long)]
    sequential: bool,

    /// Let optimizers print straight to the terminal
    #[arg(long)]
    show_tool_output: bool,

    /// Show where each optimizer resolves to and exit
    #[arg(long)]
    check_tools: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PngSqueezeCli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli).await?;

    if cli.check_tools {
        let tools = ToolPaths::resolve(&config.tools);
        print_tool_report(&tools, &config.pipeline.strategies);
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        bail!("no input file given (see --help)");
    };

    info!("Starting png-squeeze v{}", env!("CARGO_PKG_VERSION"));

    let squeezer = Squeezer::from_config(&config);
    let report = squeezer
        .squeeze(input)
        .await
        .with_context(|| format!("Failed to squeeze {}", input.display()))?;

    let output = cli.output.as_deref().unwrap_or(input);
    report
        .persist(output)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let summary = report.summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.best.is_none() {
        bail!("every strategy failed for {}", input.display());
    }

    Ok(())
}

async fn load_config(cli: &PngSqueezeCli) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    if let Some(dir) = &cli.tools_dir {
        config.tools.base_dir = Some(dir.clone());
    }
    if !cli.strategies.is_empty() {
        config.pipeline.strategies = cli.strategies.clone();
    }
    if cli.sequential {
        config.pipeline.parallel = false;
    }
    if cli.show_tool_output {
        config.pipeline.capture_output = false;
    }

    Ok(config)
}
