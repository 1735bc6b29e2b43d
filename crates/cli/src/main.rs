//! Write-back cache model CLI.
//!
//! This binary drives the cache model from the command line. It performs:
//! 1. **Workload run:** Builds a simulator from a JSON config, runs a generated workload with
//!    every read checked against a shadow memory, and prints statistics as text or JSON.
//! 2. **Geometry report:** Validates a config and prints the derived cache geometry.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use wbcache_core::Simulator;
use wbcache_core::cache::{CacheGeometry, ConstantMap};
use wbcache_core::common::SimError;
use wbcache_core::config::Config;
use wbcache_core::sim::Workload;
use wbcache_core::stats::CacheStats;

#[derive(Parser, Debug)]
#[command(
    name = "wbsim",
    author,
    version,
    about = "Direct-mapped write-back cache model",
    long_about = "Run synthetic bus traffic through a cycle-accurate write-back cache model, or inspect the geometry a configuration produces.\n\nExamples:\n  wbsim run --workload random --transactions 10000\n  wbsim run --config sdram.json --workload burst --json\n  wbsim geometry --config sdram.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a generated workload and print cache statistics.
    Run {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Traffic pattern: sequential, random, or burst.
        #[arg(short, long, default_value_t = Workload::Sequential)]
        workload: Workload,

        /// Number of transactions to generate.
        #[arg(short = 'n', long, default_value_t = 1000)]
        transactions: usize,

        /// Workload generator seed.
        #[arg(short, long, default_value_t = 1)]
        seed: u64,

        /// Print statistics as JSON.
        #[arg(long)]
        json: bool,

        /// Statistics sections to print (summary, accesses, backing); all when omitted.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
    },

    /// Validate a configuration and print the derived geometry.
    Geometry {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RunReport<'a> {
    workload: Workload,
    transactions: usize,
    seed: u64,
    cycles: u64,
    backing_reads: usize,
    backing_writes: usize,
    stats: &'a CacheStats,
}

#[derive(Serialize)]
struct GeometryReport {
    size_bytes: usize,
    data_width: u32,
    granularity: u32,
    backing_data_width: u32,
    ratio: usize,
    lines: usize,
    addr_width: u32,
    offset_bits: u32,
    line_bits: u32,
    tag_bits: u32,
    dirty_init: bool,
    constant_map: ConstantMap,
}

impl From<&CacheGeometry> for GeometryReport {
    fn from(g: &CacheGeometry) -> Self {
        let layout = g.layout();
        Self {
            size_bytes: g.size_bytes(),
            data_width: g.data_width(),
            granularity: g.granularity(),
            backing_data_width: g.backing_data_width(),
            ratio: g.ratio(),
            lines: g.lines(),
            addr_width: layout.addr_width(),
            offset_bits: layout.offset_bits(),
            line_bits: layout.line_bits(),
            tag_bits: layout.tag_bits(),
            dirty_init: g.dirty_init(),
            constant_map: g.constant_map(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            workload,
            transactions,
            seed,
            json,
            sections,
        } => cmd_run(config, workload, transactions, seed, json, &sections),
        Commands::Geometry { config, json } => cmd_geometry(config, json),
    };

    if let Err(e) = result {
        eprintln!("[!] {e}");
        process::exit(1);
    }
}

/// Loads the configuration file, or the defaults when none is given.
fn load_config(path: Option<PathBuf>) -> Result<Config, SimError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

/// Installs the log subscriber; `RUST_LOG` overrides the config's trace switch.
fn init_logging(trace: bool) {
    let default = if trace { "wbcache_core=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Runs a generated workload and prints statistics.
///
/// # Arguments
///
/// * `config` - Optional JSON configuration path.
/// * `workload` - Traffic pattern.
/// * `transactions` - Number of transactions.
/// * `seed` - Generator seed.
/// * `json` - Emit a JSON report instead of text.
/// * `sections` - Text sections to print.
fn cmd_run(
    config: Option<PathBuf>,
    workload: Workload,
    transactions: usize,
    seed: u64,
    json: bool,
    sections: &[String],
) -> Result<(), SimError> {
    let config = load_config(config)?;
    init_logging(config.general.trace);

    let mut sim = Simulator::from_config(&config)?;
    let traffic = workload.generate(sim.cache().geometry(), transactions, seed);
    let _ = sim.run_workload(&traffic)?;

    let stats = sim.cache().stats();
    if json {
        let report = RunReport {
            workload,
            transactions,
            seed,
            cycles: sim.cycle(),
            backing_reads: sim.monitor().reads().count(),
            backing_writes: sim.monitor().writes().count(),
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "[*] {workload} workload: {transactions} transactions, seed {seed}, {} cycles",
            sim.cycle()
        );
        stats.print_sections(sections);
    }
    Ok(())
}

/// Validates a configuration and prints its geometry.
fn cmd_geometry(config: Option<PathBuf>, json: bool) -> Result<(), SimError> {
    let config = load_config(config)?;
    init_logging(config.general.trace);

    let geometry = CacheGeometry::new(&config.cache, &config.backing)?;
    let report = GeometryReport::from(&geometry);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("cache.size               {} B", report.size_bytes);
    println!("cache.lines              {}", report.lines);
    println!("cache.dirty_init         {}", report.dirty_init);
    println!("bus.data_width           {} bits", report.data_width);
    println!("bus.granularity          {} bits", report.granularity);
    println!("bus.addr_width           {} bits", report.addr_width);
    println!("backing.data_width       {} bits", report.backing_data_width);
    println!("words_per_line           {}", report.ratio);
    println!(
        "addr.fields              tag[{}] line[{}] offset[{}]",
        report.tag_bits, report.line_bits, report.offset_bits
    );
    println!("constant.size            {:#x}", report.constant_map.size);
    println!("constant.cache_size      {:#x}", report.constant_map.cache_size);
    Ok(())
}
