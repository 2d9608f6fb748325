use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use metasample_cli::{RunReport, Selection};
use metasample_core::{
    AdaptiveRandomGenerator, Catalog, DomainStatistics, InputStrategy, MtArtSampler, PairStrategy,
    ParseProjection, PartitionAllocator, PartitionPairSampler, RandomInputGenerator,
    SampleInput, SamplerConfig, Seed, UniformSampler,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Adaptive, partition-weighted and metamorphic test input sampling
#[derive(Parser)]
#[command(name = "metasample", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate integers with adaptive random testing
    Art {
        #[command(flatten)]
        run: RunArgs,

        /// Candidates drawn per round
        #[arg(long, default_value_t = 10)]
        pool_size: usize,

        /// Largest magnitude a value may take
        #[arg(long, default_value_t = 999_999_999)]
        max: i64,
    },

    /// Generate integers uniformly at random
    Random {
        #[command(flatten)]
        run: RunArgs,

        /// Largest magnitude a value may take
        #[arg(long, default_value_t = 999_999_999)]
        max: i64,
    },

    /// Generate integers balanced across weighted partitions
    Partition {
        #[command(flatten)]
        run: RunArgs,

        /// Partition catalog (JSON)
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Select metamorphic pairs with MT-ART
    Mtart {
        #[command(flatten)]
        run: RunArgs,

        /// Domain of metamorphic pairs (JSON array)
        #[arg(long)]
        domain: PathBuf,
    },

    /// Select metamorphic pairs uniformly without replacement
    Uniform {
        #[command(flatten)]
        run: RunArgs,

        /// Domain of metamorphic pairs (JSON array)
        #[arg(long)]
        domain: PathBuf,
    },

    /// Select metamorphic pairs balanced across (partition, relation) cells
    Balanced {
        #[command(flatten)]
        run: RunArgs,

        /// Domain of metamorphic pairs (JSON array)
        #[arg(long)]
        domain: PathBuf,

        /// Partition catalog supplying cell weights; omitted weighs every cell equally
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show the relation x partition make-up of a domain
    Stats {
        /// Domain of metamorphic pairs (JSON array)
        #[arg(long)]
        domain: PathBuf,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Number of items to select per repetition
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Master seed; omitted means a fresh random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Independent repetitions, each with its own split seed
    #[arg(short, long, default_value_t = 1)]
    repetitions: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

type Selector = dyn Fn(usize, Seed) -> Result<(Selection, Option<String>)> + Send + Sync;

fn selector<F>(select: F) -> Arc<Selector>
where
    F: Fn(usize, Seed) -> Result<(Selection, Option<String>)> + Send + Sync + 'static,
{
    Arc::new(select)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    // Enable colors only when running in a terminal or explicitly requested
    let should_use_colors = std::env::var("FORCE_COLOR").is_ok()
        || (atty::is(atty::Stream::Stdout)
            && std::env::var("NO_COLOR").is_err()
            && std::env::var("TERM").unwrap_or_default() != "dumb");

    colored::control::set_override(should_use_colors);

    let cli = Cli::parse();

    match cli.command {
        Commands::Art { run, pool_size, max } => {
            let config = SamplerConfig::default()
                .with_candidate_pool_size(pool_size)
                .with_max_magnitude(max);
            let art = AdaptiveRandomGenerator::signed(&config)?;
            run_repetitions(
                "art",
                &run,
                selector(move |count, seed| {
                    let inputs: Vec<SampleInput<i64>> = art.generate(count, &mut seed.rng())?;
                    Ok((Selection::Inputs(inputs), None))
                }),
            )
            .await
        }
        Commands::Random { run, max } => {
            let config = SamplerConfig::default().with_max_magnitude(max);
            let random = RandomInputGenerator::signed(&config)?;
            run_repetitions(
                "random",
                &run,
                selector(move |count, seed| {
                    let inputs: Vec<SampleInput<i64>> = random.generate(count, &mut seed.rng())?;
                    Ok((Selection::Inputs(inputs), None))
                }),
            )
            .await
        }
        Commands::Partition { run, catalog } => {
            let catalog = Catalog::from_path(&catalog)?;
            let allocator = PartitionAllocator::from_catalog(&catalog)?;
            debug!(
                partitions = allocator.categories().len(),
                relations = catalog.relations.len(),
                "catalog loaded"
            );
            run_repetitions(
                "partition",
                &run,
                selector(move |count, seed| {
                    let inputs = allocator.generate(count, &mut seed.rng())?;
                    let summary = allocator.statistics(&inputs).to_string();
                    Ok((Selection::Inputs(inputs), Some(summary)))
                }),
            )
            .await
        }
        Commands::Mtart { run, domain } => {
            let domain = metasample_cli::load_domain(&domain)?;
            let config = SamplerConfig::default();
            run_repetitions(
                "mtart",
                &run,
                selector(move |count, seed| {
                    let sampler =
                        MtArtSampler::new(domain.as_slice(), ParseProjection, config.clone())?;
                    let pairs = sampler.generate(count, &mut seed.rng())?;
                    Ok((Selection::Pairs(pairs), None))
                }),
            )
            .await
        }
        Commands::Uniform { run, domain } => {
            let domain = metasample_cli::load_domain(&domain)?;
            run_repetitions(
                "uniform",
                &run,
                selector(move |count, seed| {
                    let pairs =
                        UniformSampler::new(domain.as_slice()).generate(count, &mut seed.rng())?;
                    Ok((Selection::Pairs(pairs), None))
                }),
            )
            .await
        }
        Commands::Balanced {
            run,
            domain,
            catalog,
        } => {
            let domain = metasample_cli::load_domain(&domain)?;
            let catalog = catalog.map(Catalog::from_path).transpose()?;
            run_repetitions(
                "balanced",
                &run,
                selector(move |count, seed| {
                    let sampler = match &catalog {
                        Some(catalog) => {
                            PartitionPairSampler::from_catalog(domain.as_slice(), catalog)
                        }
                        None => PartitionPairSampler::new(domain.as_slice()),
                    };
                    let pairs = sampler.generate(count, &mut seed.rng())?;
                    Ok((Selection::Pairs(pairs), None))
                }),
            )
            .await
        }
        Commands::Stats { domain } => show_stats(domain),
    }
}

/// Run `select` once per repetition on blocking tasks and print the results
/// in repetition order.
async fn run_repetitions(strategy: &str, args: &RunArgs, select: Arc<Selector>) -> Result<()> {
    if args.repetitions == 0 {
        anyhow::bail!("--repetitions must be at least 1");
    }

    let master = args.seed.map(Seed::from_u64).unwrap_or_else(Seed::random);
    info!(strategy, seed = %master, repetitions = args.repetitions, count = args.count, "sampling");

    let seeds = master.split_n(args.repetitions);
    let handles: Vec<_> = seeds
        .iter()
        .map(|&seed| {
            let select = Arc::clone(&select);
            let count = args.count;
            tokio::task::spawn_blocking(move || select(count, seed))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for ((repetition, handle), seed) in handles.into_iter().enumerate().zip(seeds) {
        let (selected, summary) = handle.await??;
        debug!(repetition = repetition + 1, selected = selected.len(), "repetition done");
        reports.push(RunReport::new(strategy, repetition + 1, seed, selected, summary));
    }

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            println!("{}", metasample_cli::format_header(strategy));
            let mut total = 0;
            for report in &reports {
                print!("{}", metasample_cli::format_report(report));
                if report.selected.len() < args.count {
                    print!(
                        "{}",
                        metasample_cli::format_shortfall(args.count, report.selected.len())
                    );
                }
                total += report.selected.len();
            }
            println!();
            print!("{}", metasample_cli::format_success(reports.len(), total));
        }
    }

    Ok(())
}

fn show_stats(path: PathBuf) -> Result<()> {
    let domain = metasample_cli::load_domain(&path)?;
    let stats = DomainStatistics::from_domain(&domain);

    println!("{}", metasample_cli::format_stats_header(domain.len()));
    println!("{}", stats);
    println!();
    println!(
        "Relations: {}, partitions: {}, populated cells: {}",
        stats.relations().count().to_string().bright_yellow(),
        stats.categories().count().to_string().bright_yellow(),
        stats.populated_cells().to_string().bright_yellow()
    );
    Ok(())
}
