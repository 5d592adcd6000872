mod policy;
mod reports;
mod seeds;
mod simulation;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use cultivation_game::GameConfig;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use policy::Strategy;
use seeds::{resolve_seed_inputs, split_csv};
use simulation::{RunParams, RunSummary, run_seed};
use storage::{FileStorage, MemoryStorage};

#[derive(Debug, Parser)]
#[command(name = "cultivation-tester", version)]
#[command(about = "Headless seeded simulations of the cultivation game engine")]
struct Args {
    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Logical seconds to play per seed
    #[arg(long, default_value_t = 600)]
    duration: u64,

    /// Automated play strategy
    #[arg(long, value_enum, default_value_t = Strategy::Balanced)]
    strategy: Strategy,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON balance configuration; defaults apply when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for file-backed saves; saves stay in memory when absent
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;

    let results = run_all(&args, &config, &seeds)?;
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🧘 Cultivation Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn run_all(args: &Args, config: &GameConfig, seeds: &[u64]) -> Result<Vec<RunSummary>> {
    let file_storage = args
        .save_dir
        .as_ref()
        .map(|dir| {
            FileStorage::open(dir)
                .with_context(|| format!("failed to open save dir {}", dir.display()))
        })
        .transpose()?;

    let mut results = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let params = RunParams {
            seed,
            strategy: args.strategy,
            duration_secs: args.duration,
            config,
        };
        let summary = match &file_storage {
            Some(storage) => run_seed(&params, storage.clone()),
            None => run_seed(&params, MemoryStorage::default()),
        }
        .with_context(|| format!("run for seed {seed} failed"))?;

        let status = if summary.passed {
            "✅".to_string()
        } else {
            "❌".red().to_string()
        };
        println!(
            "{status} seed {} ({}) reached {} in {:?}",
            seed,
            args.strategy,
            summary.stage_name,
            summary.elapsed
        );
        results.push(summary);
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[RunSummary], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let generated_at = chrono::Utc::now();

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, results, generated_at)?,
        "markdown" => {
            reports::generate_markdown_report(&mut output_target, results, generated_at)?;
        }
        _ => {
            reports::generate_console_report(&mut output_target, results, start_time.elapsed())?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            seeds: "1".to_string(),
            duration: 60,
            strategy: Strategy::Idle,
            report: "json".to_string(),
            output: None,
            config: None,
            save_dir: None,
            verbose: false,
        }
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.timers.idle_gain_ms, 2_000);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/cultivation.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn run_all_covers_every_seed() {
        let args = base_args();
        let results = run_all(&args, &GameConfig::default(), &[1, 2, 3]).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn args_parse_hex_seeds_and_strategy() {
        let args = Args::try_parse_from([
            "cultivation-tester",
            "--seeds",
            "0x10,7",
            "--strategy",
            "meditator",
            "--report",
            "markdown",
        ])
        .unwrap();
        assert_eq!(args.strategy, Strategy::Meditator);
        assert_eq!(
            resolve_seed_inputs(&split_csv(&args.seeds)).unwrap(),
            vec![16, 7]
        );
        assert!(Args::try_parse_from(["cultivation-tester", "--report", "csv"]).is_err());
    }
}
