use clap::Parser;
use std::path::PathBuf;

mod diagnostics;
mod experiment;
mod model;
mod output;
mod profile;
mod render;
mod scan;
mod settings;

use settings::{DEFAULT_BASE_DIR, Settings};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "tau-scaling")]
#[command(about = "Scaling analysis of TAU profile summaries", long_about = None)]
struct Cli {
    /// Directory tree containing `<N>nodes_<comm>_<scaling>/profile_summary.txt`.
    #[arg(default_value = DEFAULT_BASE_DIR)]
    base_dir: PathBuf,

    /// Where to write the CSV files (defaults to the base directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also write an HTML report with scaling charts.
    #[arg(long)]
    html: Option<PathBuf>,

    #[arg(long, default_value_t = experiment::DEFAULT_CORES_PER_NODE)]
    cores_per_node: u32,

    /// Cross-node spread in seconds above which a function is flagged.
    #[arg(long, default_value_t = profile::DEFAULT_IMBALANCE_THRESHOLD)]
    imbalance_threshold: f64,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let out_dir = cli.out_dir.unwrap_or_else(|| cli.base_dir.clone());
        Settings {
            base_dir: cli.base_dir,
            out_dir,
            html: cli.html,
            cores_per_node: cli.cores_per_node,
            imbalance_threshold: cli.imbalance_threshold,
        }
    }
}

fn main() -> Result<()> {
    let settings = Settings::from(Cli::parse());

    if !settings.base_dir.exists() {
        println!("Error: Directory {} not found", settings.base_dir.display());
        return Ok(());
    }

    // 1) Discover + parse reports.
    let results = scan::collect_results(&settings)?;

    // 2) Aggregate.
    let report = model::build_scaling_report(&results)?;

    // 3) CSV files.
    let rule = "=".repeat(80);
    println!("\n{}\nGenerating CSV files...", rule);
    for path in output::write_group_csvs(&report, &settings.out_dir)? {
        println!("  Created: {}", path.display());
    }

    // 4) Console comparison.
    print!("{}", output::comparison_tables(&report)?);
    println!("\n{}\nParsed {} experiment results\n{}", rule, report.experiments, rule);

    // 5) Optional HTML charts.
    if let Some(out) = &settings.html {
        let html = render::render_html_report(&report)?;
        std::fs::write(out, html)?;
        println!("Wrote {}", out.display());
    }

    Ok(())
}
