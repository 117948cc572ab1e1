use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use spha_lens::analysis::DEFAULT_THRESHOLD;
use spha_lens::config::{self, LensConfig};
use spha_lens::report::{DashboardReport, SkippedFile};
use spha_lens::{parser, products, reporters, AnalysisResult, SphaError};

const DEFAULT_TOP: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "spha-lens",
    about = "🩺 Analyse software-product health reports and track them over time",
    version,
    long_about = "Reads health-report JSON files (KPI trees with scores and thresholds),\n\
                  groups them into products by project name and shows the current\n\
                  health, threshold analysis, critical KPIs and score history.\n\n\
                  Each PATH is a report file or a directory; a directory contributes\n\
                  every *.json file inside it, in name order. Give reports oldest\n\
                  first so history and trend come out right."
)]
struct Args {
    /// Report files or directories containing them.
    #[arg(value_name = "PATH", required_unless_present = "generate_config")]
    paths: Vec<PathBuf>,

    /// Output format: terminal, json, html
    #[arg(long)]
    format: Option<String>,

    /// Output file. For --format html, defaults to ~/Desktop/health-report.html
    #[arg(long)]
    output: Option<PathBuf>,

    /// Cutoff for KPIs that carry no thresholds of their own (0-100).
    #[arg(long)]
    threshold: Option<f64>,

    /// Maximum number of critical/warning KPIs listed per product.
    #[arg(long)]
    top: Option<usize>,

    /// Validate every report and exit with an error if anything is out of range.
    #[arg(long)]
    strict: bool,

    /// YAML config file (see --generate-config).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print an annotated config template and exit. Writes to --output if given.
    #[arg(long)]
    generate_config: bool,

    /// Show debug logging on stderr.
    #[arg(long, short)]
    verbose: bool,
}

/// Effective settings after merging the config file under the CLI flags.
#[derive(Debug)]
struct Settings {
    format: String,
    output: Option<PathBuf>,
    threshold: f64,
    top: usize,
    strict: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.generate_config {
        if let Err(e) = config::print_template(args.output.as_deref()) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        if let Some(p) = &args.output {
            eprintln!("✓ Config template written to {}", p.display());
        }
        return;
    }

    let file_config = match args.config.as_deref().map(config::load_config).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let settings = match resolve_settings(&args, file_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args.paths, &settings) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn resolve_settings(args: &Args, file: LensConfig) -> Result<Settings, SphaError> {
    let format = args
        .format
        .clone()
        .or(file.format)
        .unwrap_or_else(|| "terminal".to_string());
    config::validate_format(&format).map_err(SphaError::Config)?;

    let threshold = args.threshold.or(file.default_threshold).unwrap_or(DEFAULT_THRESHOLD);
    config::validate_threshold(threshold)
        .map_err(|e| SphaError::Config(format!("Invalid --threshold: {e}")))?;

    let top = args.top.or(file.top).unwrap_or(DEFAULT_TOP);
    if top == 0 {
        return Err(SphaError::Config("Invalid --top value: 0. Must be 1 or greater".to_string()));
    }

    let output = args.output.clone().or(file.output.map(PathBuf::from));
    let output = match format.as_str() {
        "html" => Some(output.unwrap_or_else(reporters::html::default_output_path)),
        _ => output,
    };

    Ok(Settings {
        format,
        output,
        threshold,
        top,
        strict: args.strict || file.strict.unwrap_or(false),
    })
}

// ── Pipeline ───────────────────────────────────────────────────────────────────

fn run(paths: &[PathBuf], settings: &Settings) -> Result<(), SphaError> {
    let (files, mut skipped) = collect_report_files(paths);
    if files.is_empty() {
        return Err(SphaError::Config("No report files found in the given paths.".to_string()));
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    pb.set_message(format!("Parsing {} report file(s)...", files.len()));
    let parsed: Vec<(&PathBuf, Result<AnalysisResult, SphaError>)> = files
        .par_iter()
        .map(|path| (path, parser::load_report(path)))
        .collect();

    // Sequential so history order follows the order the files were given in.
    let store = products::global();
    let mut loaded = 0usize;
    for (path, outcome) in parsed {
        match outcome {
            Ok(result) => {
                store.add_result(result);
                loaded += 1;
            }
            Err(e) => {
                log::debug!("skipping {}: {e}", path.display());
                skipped.push(SkippedFile { path: path.display().to_string(), reason: skip_reason(&e) });
            }
        }
    }
    pb.finish_and_clear();

    eprintln!(
        "✔ {} report(s), {} product(s){} — ⏱ {}",
        loaded,
        store.len(),
        if skipped.is_empty() { String::new() } else { format!(", {} skipped", skipped.len()) },
        fmt_dur(start.elapsed()),
    );

    if !store.has_products() {
        for s in &skipped {
            eprintln!("   ✗ {}: {}", s.path, s.reason);
        }
        return Err(SphaError::Config("No valid health report could be loaded.".to_string()));
    }

    let report = DashboardReport::new(&store.products(), settings.threshold, settings.top, skipped);

    match settings.format.as_str() {
        "json" => reporters::json::report_json(&report, settings.output.as_deref())?,
        "html" => {
            let path = settings
                .output
                .as_deref()
                .ok_or_else(|| SphaError::Output("output path required for html".to_string()))?;
            reporters::html::report_html(&report, path)?;
        }
        _ => reporters::terminal::report_terminal(&report),
    }

    if settings.strict {
        let issues = report.issue_count();
        if issues > 0 {
            for p in &report.products {
                for issue in &p.issues {
                    eprintln!("   ✗ [{}] {issue}", p.name);
                }
            }
            return Err(SphaError::Config(format!(
                "--strict: {issues} validation issue(s) found"
            )));
        }
    }

    Ok(())
}

fn skip_reason(e: &SphaError) -> String {
    match e {
        SphaError::Io { source, .. } => format!("unreadable: {source}"),
        SphaError::Json { source, .. } => format!("not valid JSON: {source}"),
        SphaError::Rejected { .. } => "not a health report".to_string(),
        other => other.to_string(),
    }
}

// ── Input discovery ────────────────────────────────────────────────────────────

/// Expands each path into report files. Directories contribute their `*.json`
/// files sorted by name; missing paths are returned as skipped.
fn collect_report_files(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<SkippedFile>) {
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(json_files_in(path));
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            skipped.push(SkippedFile {
                path: path.display().to_string(),
                reason: "path does not exist".to_string(),
            });
        }
    }
    (files, skipped)
}

fn json_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else { return Vec::new() };
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();
    found.sort();
    found
}

// ── Duration formatting ────────────────────────────────────────────────────────

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 { format!("{:.1}s", d.as_secs_f64()) } else { format!("{ms}ms") }
}
