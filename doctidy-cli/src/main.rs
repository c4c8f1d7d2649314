use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use doctidy::ConsoleDecisions;
use doctidy_core::{
    load_rules_folder, AuditLog, BatchReport, ClassificationPipeline, CompositeExtractor,
    JsonAuditLog, MemoryAuditLog, PdfTextExtractor, PipelineContext, PlainTextExtractor, RuleSet,
    Settings, StdFileSystem, TextExtractor,
};

const DEFAULT_CONFIG_FILE: &str = "doctidy.yaml";

#[derive(Parser)]
#[command(name = "doctidy")]
#[command(about = "File scanned documents into place using keyword rules and dates found in their text")]
struct Args {
    /// Process only this file instead of the configured input folder
    file: Option<PathBuf>,

    /// Settings file (YAML). Defaults to ./doctidy.yaml, then the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rules folder, overriding `rules_folder` from the settings
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Classify and report without filing anything
    #[arg(long, conflicts_with = "apply")]
    dry_run: bool,

    /// Ask for a disposition for every classified document
    #[arg(long)]
    apply: bool,

    /// Print the loaded rules in match order and exit
    #[arg(long)]
    list_rules: bool,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("📑 Doctidy");

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(rules_dir) = &args.rules_dir {
        settings.rules_folder = rules_dir.clone();
    }

    let replacements = settings
        .replacement_table()
        .context("Invalid date_replacement_patterns")?;
    if !replacements.is_empty() {
        println!("📋 {} date replacement pattern(s)", replacements.len());
    }
    let rules = load_rules_folder(&settings.rules_folder, settings.default_culture())
        .context("Failed to load rules")?;
    println!("📋 {} rule(s) loaded", rules.len());

    if args.list_rules {
        print_rules(&rules);
        return Ok(());
    }

    if rules.is_empty() {
        eprintln!("{}", "⚠️  No usable rules, every document will be unclassified".yellow());
    }

    let mut console = ConsoleDecisions::stdio();
    let dry_run = if args.dry_run {
        true
    } else if args.apply {
        false
    } else {
        console.ask_dry_run()
    };
    if dry_run {
        println!("{}", "🔍 Dry run, documents stay where they are".cyan());
    }

    let audit_log: Box<dyn AuditLog> = if dry_run {
        Box::new(MemoryAuditLog::new())
    } else {
        Box::new(JsonAuditLog::open(&settings.logs_file).context("Failed to open audit log")?)
    };

    let extractors: Vec<Box<dyn TextExtractor>> = vec![
        Box::new(PdfTextExtractor::new()),
        Box::new(PlainTextExtractor::new()),
    ];
    let extractor = CompositeExtractor::new(extractors);

    let mut pipeline = ClassificationPipeline::new(PipelineContext {
        settings,
        rules,
        replacements,
        extractor: Box::new(extractor),
        fs: Box::new(StdFileSystem::new()),
        audit_log,
        decisions: Box::new(console),
        dry_run,
        today: None,
    });

    let report = match &args.file {
        Some(file) => {
            if !file.is_file() {
                bail!("Input file not found: {}", file.display());
            }
            pipeline.process_batch(std::slice::from_ref(file))
        }
        None => pipeline.run_input_folder()?,
    };

    print_report(&report);
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--config` must load; a discovered file falls back to defaults
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let settings = Settings::load_from_file(path)?;
        println!("📋 Loaded config from: {}", path.display());
        return Ok(settings);
    }

    match discover_config() {
        Some(path) => {
            println!("📋 Loaded config from: {}", path.display());
            Ok(Settings::load_with_fallback(Some(&path)))
        }
        None => {
            println!("📋 Using default config");
            Ok(Settings::default())
        }
    }
}

fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("doctidy").join("config.yaml"))
        .filter(|path| path.is_file())
}

fn print_rules(rules: &RuleSet) {
    for (position, rule) in rules.iter().enumerate() {
        println!("\n{}. {}", position + 1, rule.name.bold());
        println!("   destination: {}", rule.destination_path.display());
        println!("   filename:    {}", rule.filename_pattern);
        println!("   keywords:    [{}]", rule.keyword_patterns().collect::<Vec<_>>().join(", "));
        match &rule.date {
            Some(date) => {
                println!(
                    "   date:        {} as {} ({}, skip {})",
                    date.pattern.as_str(),
                    date.parse_format.source(),
                    display_culture(date.culture.id()),
                    date.skip
                );
            }
            None => println!("   date:        today"),
        }
    }
}

fn display_culture(id: &str) -> &str {
    if id.is_empty() {
        "invariant"
    } else {
        id
    }
}

fn print_report(report: &BatchReport) {
    println!("\n📊 {} document(s) processed", report.processed);
    println!("   - Classified:   {}", report.classified());
    if report.dry_run > 0 {
        println!("   - Dry run:      {}", report.dry_run);
    }
    println!("   - Moved:        {}", report.moved);
    println!("   - Copied:       {}", report.copied);
    println!("   - Skipped:      {}", report.skipped);
    if report.move_abandoned > 0 {
        println!("   - {}", format!("Move abandoned: {}", report.move_abandoned).yellow());
    }
    if report.collisions > 0 {
        println!("   - {}", format!("Already filed:  {}", report.collisions).yellow());
    }
    if report.unclassified > 0 {
        println!("   - {}", format!("Unclassified:   {}", report.unclassified).red());
    }
    if report.extraction_failed + report.failed > 0 {
        println!(
            "   - {}",
            format!("Failed:         {}", report.extraction_failed + report.failed).red()
        );
    }
}
