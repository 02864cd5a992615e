//! Motifweek CLI: runs the period pipeline from a YAML config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use motifweek::{PeriodDriver, PeriodReport, PipelineConfig, Schedule};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "motifweek", version, about = "Weekly motif census over interaction logs")]
struct Cli {
    /// Pipeline config (YAML)
    #[arg(long, short, global = true, default_value = "motifweek.yaml", env = "MOTIFWEEK_CONFIG")]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scheduled period
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the period windows without reading any log
    Schedule {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Settings that take precedence over the config file
#[derive(clap::Args)]
struct Overrides {
    /// First day, yyMMdd
    #[arg(long)]
    start: Option<String>,
    /// Last day (exclusive), yyMMdd
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    period_days: Option<u32>,
    #[arg(long)]
    percentile: Option<f64>,
    #[arg(long)]
    hard_thre: Option<u32>,
    #[arg(long)]
    hard_cap_asym: Option<u64>,
    /// Skip interactions where exactly one endpoint is already known
    #[arg(long)]
    indep: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    node_cap: Option<usize>,
    /// Directory for motif files
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(start) = self.start {
            config.schedule.start = start;
        }
        if let Some(end) = self.end {
            config.schedule.end = end;
        }
        if let Some(days) = self.period_days {
            config.schedule.period_days = days;
        }
        if let Some(p) = self.percentile {
            config.filter.percentile = p;
        }
        if let Some(thre) = self.hard_thre {
            config.filter.hard_thre = thre;
        }
        if let Some(cap) = self.hard_cap_asym {
            config.filter.hard_cap_asym = cap;
        }
        if self.indep {
            config.filter.indep = true;
        }
        if self.seed.is_some() {
            config.sampling.seed = self.seed;
        }
        if self.node_cap.is_some() {
            config.node_cap = self.node_cap;
        }
        if let Some(dir) = self.out_dir {
            config.output.dir = dir;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("motifweek=info")),
        )
        .init();

    let cli = Cli::parse();
    // validated after the overrides, by the driver or by print_schedule
    let mut config = PipelineConfig::read(&cli.config)
        .with_context(|| format!("loading {:?}", cli.config))?;

    match cli.command {
        Commands::Run { overrides } => {
            overrides.apply(&mut config);
            run_pipeline(config, &cli.format)
        }
        Commands::Schedule { overrides } => {
            overrides.apply(&mut config);
            print_schedule(&config, &cli.format)
        }
    }
}

fn run_pipeline(config: PipelineConfig, format: &OutputFormat) -> Result<()> {
    info!("motifweek v{}", motifweek::version());
    let mut driver = PeriodDriver::new(config)?;
    let out_dir = &driver.config().output.dir;
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {:?}", out_dir))?;

    let reports = driver.run()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => print_reports(&reports),
    }
    Ok(())
}

fn print_reports(reports: &[PeriodReport]) {
    if reports.is_empty() {
        println!("(no periods)");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Period", "Start", "Nodes", "Removed", "Edges", "Sample", "All", "Adopted", "Unobserved",
    ]);

    for r in reports {
        table.add_row(vec![
            r.window.index.to_string(),
            r.window.start.to_string(),
            r.outlier.surviving.to_string(),
            r.outlier.removed().to_string(),
            r.graph.edges.to_string(),
            r.sample_size.to_string(),
            r.written.all.to_string(),
            r.written.adopted.to_string(),
            r.written.unobserved.to_string(),
        ]);
    }

    println!("{}", table);
    println!("{} period(s)", reports.len());
}

fn print_schedule(config: &PipelineConfig, format: &OutputFormat) -> Result<()> {
    config.validate()?;
    let schedule = Schedule::from_config(config)?;
    let windows: Vec<_> = schedule.windows().collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&windows)?),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Period", "Start", "Boundary", "Horizon"]);
            for w in &windows {
                table.add_row(vec![
                    w.index.to_string(),
                    w.start.to_string(),
                    w.boundary.to_string(),
                    w.horizon.to_string(),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
