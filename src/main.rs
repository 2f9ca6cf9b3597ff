use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use i18n_audit::config::{self, AuditConfig};
use i18n_audit::{
    descriptors, resolve_framework, run_check, run_scan, run_usage, CheckQuery, MarkdownFormatter,
    Report, ReportFormatter, ScanQuery, SimpleFormatter, TreeCache, UsageQuery,
};

/// i18n Audit - Find missing translations, broken placeholders and hardcoded text
#[derive(Parser, Debug)]
#[command(name = "i18n-audit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: .i18n-audit.toml found from the project upwards)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Cache parsed translation files between runs
    #[arg(long, global = true)]
    cache: bool,

    /// Empty the parsed translation cache before running
    #[arg(long, global = true)]
    clear_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare every language against the reference language
    Check(CheckArgs),
    /// Find hardcoded user-facing text in source files
    Scan(ScanArgs),
    /// Cross-check translation keys used in code against the reference language
    Usage(UsageArgs),
    /// List framework descriptors and the detection ranking for a project
    Frameworks {
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Args, Debug)]
struct LocaleArgs {
    /// Project root
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Locales directory (default: first of locales, src/locales, public/locales, ...)
    #[arg(long, value_name = "DIR")]
    locales: Option<PathBuf>,

    /// Reference language
    #[arg(long, value_name = "LANG")]
    source_language: Option<String>,

    /// Maximum keys listed per issue
    #[arg(long, default_value = "10")]
    limit: usize,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    locale: LocaleArgs,

    /// Values treated as not translated (replaces the configured list)
    #[arg(long = "marker", value_name = "MARKER")]
    markers: Vec<String>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Project root
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Minimum length of reported text, in characters
    #[arg(long)]
    min_length: Option<usize>,

    /// Maximum length of reported text, in characters
    #[arg(long)]
    max_length: Option<usize>,

    /// Additional glob to exclude (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Also scan test and spec files
    #[arg(long)]
    include_tests: bool,

    /// Framework id instead of detection (see `i18n-audit frameworks`)
    #[arg(long, value_name = "ID")]
    framework: Option<String>,

    /// Worker threads (default: number of CPUs)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    #[arg(long, value_enum, default_value_t = ScanFormat::Text)]
    format: ScanFormat,
}

#[derive(Args, Debug)]
struct UsageArgs {
    #[command(flatten)]
    locale: LocaleArgs,

    /// Framework id instead of detection
    #[arg(long, value_name = "ID")]
    framework: Option<String>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
    Simple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScanFormat {
    Text,
    Json,
    Simple,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Explicit --config file, else the nearest .i18n-audit.toml, else defaults
fn load_config(explicit: Option<&Path>, root: &Path, cache: bool) -> Result<AuditConfig> {
    let config = match explicit {
        Some(path) => AuditConfig::from_file(path)?,
        None => config::load_config(root)?,
    };
    Ok(if cache { config.with_cache(true) } else { config })
}

fn apply_locale_args(mut config: AuditConfig, args: &LocaleArgs) -> AuditConfig {
    if let Some(dir) = &args.locales {
        config = config.with_locales_dir(dir);
    }
    if let Some(language) = &args.source_language {
        config = config.with_source_language(language);
    }
    config
}

fn render_report(report: &Report, format: ReportFormat, limit: usize) -> Result<String> {
    Ok(match format {
        ReportFormat::Text => ReportFormatter::new().with_limit(limit).format(report),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")? + "\n"
        }
        ReportFormat::Markdown => MarkdownFormatter::new(limit).format(report),
        ReportFormat::Simple => SimpleFormatter::new().format_report(report),
    })
}

fn run(cli: Cli) -> Result<i32> {
    if cli.clear_cache {
        let cache = TreeCache::new().context("Failed to open cache")?;
        cache.clear()?;
        eprintln!("Cleared cache at {}", cache.cache_dir().display());
    }

    match cli.command {
        Command::Check(args) => {
            let config = load_config(cli.config.as_deref(), &args.locale.path, cli.cache)?;
            let mut config = apply_locale_args(config, &args.locale);
            if !args.markers.is_empty() {
                config = config.with_not_translated_markers(args.markers.clone());
            }

            let report = run_check(CheckQuery::new(&args.locale.path).with_config(config))?;
            print!("{}", render_report(&report, args.format, args.locale.limit)?);
            Ok(report.exit_code())
        }
        Command::Scan(args) => {
            let mut config = load_config(cli.config.as_deref(), &args.path, cli.cache)?;
            if args.min_length.is_some() || args.max_length.is_some() {
                let min_length = args.min_length.unwrap_or(config.min_length);
                let max_length = args.max_length.unwrap_or(config.max_length);
                config = config.with_length_bounds(min_length, max_length);
            }
            if !args.exclude.is_empty() {
                let mut exclusions = config.exclusions.clone();
                exclusions.extend(args.exclude.iter().cloned());
                config = config.with_exclusions(exclusions);
            }
            if args.include_tests {
                config = config.with_include_tests(true);
            }
            if let Some(jobs) = args.jobs {
                config = config.with_concurrency(jobs);
            }

            let mut query = ScanQuery::new(&args.path).with_config(config);
            if let Some(framework) = &args.framework {
                query = query.with_framework(framework);
            }
            let result = run_scan(query)?;

            match args.format {
                ScanFormat::Text => print!("{}", ReportFormatter::new().format_scan(&result)),
                ScanFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialize scan")?
                ),
                ScanFormat::Simple => {
                    print!("{}", SimpleFormatter::new().format_occurrences(&result.occurrences))
                }
            }
            if let Some(reason) = &result.reason {
                warn!("Scan aborted: {}", reason);
            }
            Ok(result.exit_code())
        }
        Command::Usage(args) => {
            let config = load_config(cli.config.as_deref(), &args.locale.path, cli.cache)?;
            let config = apply_locale_args(config, &args.locale);

            let mut query = UsageQuery::new(&args.locale.path).with_config(config);
            if let Some(framework) = &args.framework {
                query = query.with_framework(framework);
            }
            let report = run_usage(query)?;
            print!("{}", render_report(&report, args.format, args.locale.limit)?);
            Ok(report.exit_code())
        }
        Command::Frameworks { path, format } => {
            let selection = resolve_framework(&path, None)?;
            match format {
                ReportFormat::Json => {
                    let available: Vec<_> = descriptors()
                        .iter()
                        .map(|d| {
                            serde_json::json!({ "id": d.id, "name": d.name, "priority": d.priority })
                        })
                        .collect();
                    let value = serde_json::json!({
                        "selected": selection.descriptor.id,
                        "confidence": selection.confidence,
                        "reason": selection.reason,
                        "candidates": selection.candidates,
                        "available": available,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                _ => {
                    print!("{}", ReportFormatter::new().format_selection(&selection));
                    println!("\nAvailable:");
                    for descriptor in descriptors() {
                        println!("  {:<14} {}", descriptor.id, descriptor.name);
                    }
                }
            }
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(2);
        }
    }
}
