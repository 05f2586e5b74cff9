//! AdWipe CLI
//!
//! CLI tool for compiling rule tables, sweeping document fixtures, and
//! inspecting usage statistics.

mod fixture;
mod stats;
mod stress;

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};

use aw_core::dom::MutationBatch;
use aw_core::schedule::ImmediateDeferred;
use aw_core::sweep::SweepTables;
use aw_core::{Engine, EngineConfig};
use aw_rules::{defaults, parse_selector_list, UrlFilterSet};

use fixture::{build_tree, DocumentFixture};
use stats::{SharedStats, UsageStats};

#[derive(Parser)]
#[command(name = "aw-cli")]
#[command(about = "AdWipe rule compiler and sweep tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine over a JSON document fixture
    Sweep {
        /// Fixture file
        #[arg(short, long)]
        doc: String,

        /// Strict selector list file (bundled table if omitted)
        #[arg(long)]
        strict: Option<String>,

        /// Site-specific selector list file (bundled table if omitted)
        #[arg(long)]
        site: Option<String>,

        /// Stats file to update with removals
        #[arg(long)]
        stats: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compile and dump rule tables
    Compile {
        /// Selector list file
        #[arg(short, long)]
        selectors: Option<String>,

        /// URL blocklist pattern file (one pattern per line)
        #[arg(short, long)]
        blocklist: Option<String>,
    },

    /// Render a usage statistics summary
    Stats {
        /// Stats file
        #[arg(short, long)]
        input: String,
    },

    /// Drive a synthetic mutation burst through the engine
    Stress {
        /// Number of candidate elements inserted in one batch
        #[arg(short, long, default_value_t = 2000)]
        elements: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sweep {
            doc,
            strict,
            site,
            stats,
            verbose,
        } => cmd_sweep(&doc, strict.as_deref(), site.as_deref(), stats.as_deref(), verbose),
        Commands::Compile { selectors, blocklist } => {
            cmd_compile(selectors.as_deref(), blocklist.as_deref())
        }
        Commands::Stats { input } => cmd_stats(&input),
        Commands::Stress { elements } => cmd_stress(elements),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_rule_set(path: Option<&str>, bundled: &str) -> Result<aw_core::RuleSet, String> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
            Ok(parse_selector_list(&text))
        }
        None => Ok(parse_selector_list(bundled)),
    }
}

fn cmd_sweep(
    doc_path: &str,
    strict: Option<&str>,
    site: Option<&str>,
    stats_path: Option<&str>,
    verbose: bool,
) -> Result<(), String> {
    let text = fs::read_to_string(doc_path)
        .map_err(|e| format!("Failed to read '{}': {}", doc_path, e))?;
    let doc_fixture: DocumentFixture =
        serde_json::from_str(&text).map_err(|e| format!("Invalid fixture '{}': {}", doc_path, e))?;
    let (mut doc, top_level) = build_tree(&doc_fixture);
    let before = doc.len();

    let tables = SweepTables {
        strict: load_rule_set(strict, defaults::STRICT_SELECTORS)?,
        site: load_rule_set(site, defaults::SITE_SELECTORS)?,
        players: defaults::player_rules(),
    };

    let mut engine = Engine::with_dispatch(
        EngineConfig::default(),
        tables,
        Box::new(ImmediateDeferred),
    );
    engine.set_net_policy(Box::new(defaults::default_url_filters()));

    let shared = stats_path
        .map(|path| -> Result<SharedStats, String> {
            let stats = UsageStats::load(Path::new(path))?;
            Ok(SharedStats::new(stats))
        })
        .transpose()?;
    if let Some(shared) = &shared {
        engine.set_stats_sink(Box::new(shared.clone()));
    }

    engine.on_mutations(&MutationBatch::of(top_level), 0);

    let mut removed = 0usize;
    let mut now = 0u64;
    let mut quiet_ticks = 0;
    while quiet_ticks < 20 {
        let report = engine.tick(&mut doc, now, true);
        if report.flushed {
            quiet_ticks = 0;
            removed += report.removed.len();
            if verbose {
                for id in &report.removed {
                    println!("  [{}ms] removed node {}", now, id);
                }
            }
        } else {
            quiet_ticks += 1;
        }
        now += 50;
    }

    if let (Some(shared), Some(path)) = (&shared, stats_path) {
        shared.snapshot().save(Path::new(path))?;
    }

    println!("Swept '{}' ({})", doc_path, doc.origin_host());
    println!("  Elements: {} -> {}", before, doc.len());
    println!("  Removed:  {}", removed);
    println!("  Time:     {}ms simulated", now);

    Ok(())
}

fn cmd_compile(selectors: Option<&str>, blocklist: Option<&str>) -> Result<(), String> {
    if selectors.is_none() && blocklist.is_none() {
        return Err("Specify --selectors and/or --blocklist".to_string());
    }

    if let Some(path) = selectors {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
        let line_count = text.lines().count();
        let set = parse_selector_list(&text);
        println!("Compiled '{}': {} lines, {} selectors", path, line_count, set.len());
        for selector in set.iter() {
            println!("  {:?}", selector);
        }
    }

    if let Some(path) = blocklist {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
        let patterns: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('!'))
            .collect();
        let set = UrlFilterSet::compile(&patterns);
        println!("Compiled '{}': {} patterns, {} filters", path, patterns.len(), set.len());
    }

    Ok(())
}

fn cmd_stats(input: &str) -> Result<(), String> {
    let stats = UsageStats::load(Path::new(input))?;

    println!("Stats: {}", input);
    println!("  Total blocked:   {}", stats.total_blocked);
    println!("  Session blocked: {}", stats.session_blocked);
    println!(
        "  Last blocked:    {}",
        stats.last_blocked.as_deref().unwrap_or("-")
    );
    println!();
    println!("Top domains:");
    let top = stats.top_domains(5);
    if top.is_empty() {
        println!("  No data yet.");
    } else {
        for (domain, count) in top {
            println!("  {:<40} {}", domain, count);
        }
    }

    Ok(())
}

fn cmd_stress(elements: usize) -> Result<(), String> {
    let outcome = stress::run(elements);
    let cap = EngineConfig::default().max_elements_per_root;

    println!("Stress: {} candidate elements in one batch", outcome.elements);
    println!("  Flushes:                {}", outcome.flushes);
    println!(
        "  First-flush classified: {} (cap {})",
        outcome.classified_first_flush, cap
    );
    println!("  Removed:                {}", outcome.removed_total);
    println!("  Remaining elements:     {}", outcome.remaining);
    println!("  Quiescent after:        {}ms simulated", outcome.quiescent_at_ms);

    Ok(())
}
