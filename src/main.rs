//! tree-height CLI: estimate tree heights from photographs.

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tree_height::config::load_params;
use tree_height::image::io::write_json_file;
use tree_height::{AnalyzerParams, EstimationReport, ReferenceKind, TreeHeightAnalyzer};

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const DISPLAY_DEFAULT_M: f64 = 12.5;

#[derive(Parser)]
#[command(name = "tree-height")]
#[command(about = "Estimate the height of a tree from a single photograph")]
#[command(version)]
struct Cli {
    /// Images to analyze (png, jpg, jpeg).
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Known-size object to calibrate against.
    #[arg(long, value_enum, default_value_t = ReferenceArg::Auto)]
    reference: ReferenceArg,

    /// Real height of the reference object in meters [default: from config, 1.7].
    #[arg(long)]
    reference_height: Option<f64>,

    /// JSON file overriding analyzer parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write per-image estimation reports (JSON).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Height of the comparison unit in the summary message (meters).
    #[arg(long, default_value = "1.88")]
    comparison_height: f64,

    /// Log stage details.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReferenceArg {
    Auto,
    Person,
    Ruler,
    None,
}

impl ReferenceArg {
    fn to_core(self) -> ReferenceKind {
        match self {
            ReferenceArg::Auto => ReferenceKind::Auto,
            ReferenceArg::Person => ReferenceKind::Person,
            ReferenceArg::Ruler => ReferenceKind::Ruler,
            ReferenceArg::None => ReferenceKind::None,
        }
    }
}

fn allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Replace an absent or non-positive estimate by the display default.
fn display_height(estimate: Option<f64>) -> f64 {
    match estimate {
        Some(h) if h > 0.0 => h,
        _ => DISPLAY_DEFAULT_M,
    }
}

fn comparison_message(height_m: f64, unit_m: f64) -> String {
    format!(
        "your tree is about {:.1} {unit_m}m-tall units ({height_m:.2} m)",
        height_m / unit_m
    )
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if cli.comparison_height.is_nan() || cli.comparison_height <= 0.0 {
        return Err(format!(
            "--comparison-height must be positive, got {}",
            cli.comparison_height
        ));
    }

    let params = match &cli.config {
        Some(path) => load_params(path)?,
        None => AnalyzerParams::default(),
    };
    let analyzer = TreeHeightAnalyzer::new(params);
    let kind = cli.reference.to_core();
    let reference_height = analyzer.reference_height(cli.reference_height);

    let (accepted, rejected): (Vec<&PathBuf>, Vec<&PathBuf>) =
        cli.images.iter().partition(|p| allowed_file(p));
    for path in rejected {
        println!("{}: file type not allowed", path.display());
    }

    let reports: Vec<(&PathBuf, EstimationReport)> = accepted
        .par_iter()
        .map(|path| {
            let report = analyzer.estimate_with_report(path, kind, reference_height);
            (*path, report)
        })
        .collect();

    for (path, report) in &reports {
        info!("{}: {}", path.display(), report.summary());
        let estimate = Some(report.height_m).filter(|h| h.is_finite());
        let height = display_height(estimate);
        println!(
            "{}: {}",
            path.display(),
            comparison_message(height, cli.comparison_height)
        );
    }

    if let Some(out) = &cli.report {
        let list: Vec<&EstimationReport> = reports.iter().map(|(_, r)| r).collect();
        write_json_file(out, &list)?;
    }
    Ok(())
}
