use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use seed_module_expander::config::{ExpansionConfig, SeedPolicy, UpdateStrategy};
use seed_module_expander::data::{self, NetworkFormat};
use seed_module_expander::expansion::{ExpansionDriver, Termination};
use seed_module_expander::storage::{self, GraphStats};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Edgelist,
    String,
}

impl From<FormatArg> for NetworkFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => NetworkFormat::Auto,
            FormatArg::Edgelist => NetworkFormat::EdgeList,
            FormatArg::String => NetworkFormat::String,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "seed-module-expander",
    about = "Expand seed genes into a connected disease module with a hypergeometric connectivity test"
)]
struct Cli {
    /// Network file (edge list or STRING-like table)
    network: PathBuf,

    /// Seeds file (one gene per line). Defaults to ENO1, PGK1, HK2
    #[clap(long, short)]
    seeds: Option<PathBuf>,

    /// Number of genes to add
    #[clap(long, short, default_value = "200", allow_negative_numbers = true)]
    num: i64,

    /// Seed weight alpha (>= 1)
    #[clap(long, short, default_value = "1", allow_negative_numbers = true)]
    alpha: i64,

    /// Output file for added genes
    #[clap(long, short, default_value = "output.txt")]
    out: PathBuf,

    /// Minimum edge score (STRING input defaults to 400)
    #[clap(long)]
    score_threshold: Option<f64>,

    /// Network file layout
    #[clap(long, value_enum, default_value = "auto")]
    format: FormatArg,

    /// Fail if any seed is missing from the network
    #[clap(long)]
    strict_seeds: bool,

    /// Recompute every candidate each iteration instead of updating incrementally
    #[clap(long)]
    full_recompute: bool,

    /// Write rank, p-value, k_s and degree next to each gene
    #[clap(long)]
    pvalues: bool,

    /// Write a JSON run summary to this path
    #[clap(long)]
    summary: Option<PathBuf>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let alpha = if args.alpha < 1 {
        log::warn!("alpha {} is below 1, using 1", args.alpha);
        1
    } else {
        u32::try_from(args.alpha).context("alpha is too large")?
    };

    let mut config = ExpansionConfig::new(args.num.max(0) as usize, alpha);
    config.score_threshold = args.score_threshold;
    if args.full_recompute {
        config = config.with_strategy(UpdateStrategy::FullRecompute);
    }
    if args.strict_seeds {
        config = config.with_seed_policy(SeedPolicy::Strict);
    }

    let graph = data::load_network(&args.network, args.format.into(), config.score_threshold)
        .with_context(|| format!("failed to load network {}", args.network.display()))?;
    log::debug!("Network memory usage: {} bytes", graph.memory_usage());
    let graph_stats = GraphStats::of(&graph);

    let seeds = data::load_seeds(args.seeds.as_deref())?;
    log::info!("Using seeds: {}", seeds.join(", "));

    log::info!("Running module expansion");
    let result = ExpansionDriver::new(graph, &seeds, config.clone())?.run()?;

    if result.termination == Termination::CandidatesExhausted {
        log::info!(
            "Candidates exhausted: added {} of {} requested genes",
            result.admissions.len(),
            config.num_nodes
        );
    }

    storage::save_results(&result, &args.out, args.pvalues)?;
    if let Some(summary) = &args.summary {
        storage::save_summary(&result, &graph_stats, &config, summary)?;
    }

    log::info!("Done: results saved to {}", args.out.display());

    Ok(())
}
