use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pixdup::config::{DetectorConfig, PolicyKind};
use pixdup::detect::DuplicateFinder;
use pixdup::{exact, scan};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "pixdup", version, about = "Find exact and modified duplicate images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find modified or re-encoded copies via perceptual fingerprints
    Scan {
        /// Directory to scan
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,

        /// Threshold policy for the pairwise phase
        #[arg(long, value_enum, default_value = "tiered")]
        policy: Policy,

        /// Fingerprint grid height
        #[arg(long, default_value_t = 30)]
        grid_height: u32,

        /// Fingerprint grid width
        #[arg(long, default_value_t = 30)]
        grid_width: u32,

        /// Hamming distance below which a pair is modified outright
        /// (default 0.05 tiered, 0.10 single)
        #[arg(long)]
        hamming_low: Option<f64>,

        /// Hamming distance below which MSE confirmation applies (tiered only)
        #[arg(long, default_value_t = 0.35)]
        hamming_high: f64,

        /// MSE below which a mid-Hamming pair is confirmed (tiered only)
        #[arg(long, default_value_t = 2000.0)]
        mse_high: f64,

        /// Emit the full report as JSON instead of pair lines
        #[arg(long)]
        json: bool,
    },

    /// List groups of byte-identical image files
    Identical {
        /// Directory to scan
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Policy {
    Tiered,
    Single,
}

impl From<Policy> for PolicyKind {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Tiered => PolicyKind::Tiered,
            Policy::Single => PolicyKind::Single,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            policy,
            grid_height,
            grid_width,
            hamming_low,
            hamming_high,
            mse_high,
            json,
        } => {
            let kind = PolicyKind::from(policy);
            let config = DetectorConfig {
                grid_height,
                grid_width,
                required_channels: 3,
                hamming_low: hamming_low.unwrap_or_else(|| kind.default_hamming_low()),
                hamming_high,
                mse_high,
                policy: kind,
            };

            let images = scan_with_spinner(&path)?;
            println!("▶ Fingerprinting {} images…", images.len());

            let finder = DuplicateFinder::new(config);
            let report = benchmark("fingerprint + pairwise comparison", || finder.run(&images))?;

            for exclusion in &report.exclusions {
                eprintln!(
                    "⚠️  Skipped {}: {}",
                    exclusion.path.display(),
                    exclusion.reason
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.pairs.is_empty() {
                println!("No duplicate or modified images found.");
            } else {
                for pair in &report.pairs {
                    println!("{} {}", basename(&pair.first), basename(&pair.second));
                }
            }
        }

        Commands::Identical { path } => {
            let images = scan_with_spinner(&path)?;
            let groups = exact::identical_groups(&images);
            if groups.is_empty() {
                println!("No byte-identical files found.");
            } else {
                for group in groups {
                    let names: Vec<String> = group.iter().map(|p| basename(p)).collect();
                    println!("{}", names.join(" "));
                }
            }
        }
    }

    Ok(())
}

/// Walk `dir` for images behind a spinner.
fn scan_with_spinner(dir: &Path) -> Result<Vec<PathBuf>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning for images…");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let images = scan::scan_directory(dir);

    spinner.finish_with_message(format!("Found {} image file(s)", images.len()));
    Ok(images)
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    println!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
