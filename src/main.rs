//! CLI entry point for cugo.
//!
//! `cugo parse` turns GFF annotations into CUGO tables; `cugo context`
//! extracts CUGO context windows around target genes from those tables.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cugo::config::{Config, ContextConfig};
use cugo::context::{read_targets, write_context, ContextExtractor};
use cugo::output::{genome_stem, write_atomically, write_table};

/// Colocated unidirectional gene organization (CUGO) tools.
#[derive(Parser, Debug)]
#[command(name = "cugo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign every coding gene of a GFF file to a CUGO
    Parse(ParseArgs),
    /// Extract CUGO context windows around target genes
    Context(ContextArgs),
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// GFF annotation file(s) (required, .gz supported)
    #[arg(short = 'g', long = "gff", required = true, num_args = 1..)]
    gff: Vec<PathBuf>,

    /// Output file; a directory when several GFF files are given (required)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// GFF feature type treated as protein coding
    #[arg(short = 'f', long = "feature-type", default_value = "CDS")]
    feature_type: String,

    /// Number of worker threads for several inputs (0 = auto-detect)
    #[arg(long = "threads", short = 'j', default_value = "0")]
    threads: usize,
}

#[derive(Args, Debug)]
struct ContextArgs {
    /// File with target gene ids, one per line (required)
    #[arg(short = 'i', long = "ids")]
    ids: PathBuf,

    /// Directory with <genome>_cugo.tab tables (required)
    #[arg(short = 'd', long = "cugo-dir")]
    cugo_dir: PathBuf,

    /// Optional directory with <genome>_tmhmm_clean topology tables
    #[arg(short = 't', long = "tmhmm-dir")]
    tmhmm_dir: Option<PathBuf>,

    /// Context range in CUGO steps from the target's CUGO
    #[arg(short = 'r', long = "range", default_value = "0")]
    range: u64,

    /// Output file (required)
    #[arg(short = 'o', long = "output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let started = Instant::now();

    match cli.command {
        Command::Parse(args) => run_parse(args)?,
        Command::Context(args) => run_context(args)?,
    }

    info!("Done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}

/// Pair every input with its output path.
fn plan_outputs(gff: &[PathBuf], output: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    if gff.len() == 1 {
        return Ok(vec![(gff[0].clone(), output.to_path_buf())]);
    }

    let naming = ContextConfig::default();
    let mut seen = HashSet::new();
    let mut plan = Vec::with_capacity(gff.len());
    for input in gff {
        let stem = genome_stem(input);
        if !seen.insert(stem.clone()) {
            bail!("Several GFF files share the genome name '{}'", stem);
        }
        plan.push((input.clone(), output.join(naming.cugo_file_name(&stem))));
    }
    Ok(plan)
}

fn run_parse(args: ParseArgs) -> Result<()> {
    // Validate inputs
    for input in &args.gff {
        if !input.is_file() {
            bail!("GFF file not found: {}", input.display());
        }
    }

    let mut config = Config::new();
    config.coding_feature_type = args.feature_type.clone();

    let plan = plan_outputs(&args.gff, &args.output)?;
    if args.gff.len() > 1 {
        fs::create_dir_all(&args.output).with_context(|| {
            format!("Failed to create output directory {}", args.output.display())
        })?;
    }

    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };

    if plan.len() == 1 || num_threads == 1 {
        for (input, output) in &plan {
            process_gff(input, output, &config)?;
        }
        return Ok(());
    }

    info!(
        "Processing {} GFF files with {} threads",
        plan.len(),
        num_threads
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;

    pool.install(|| {
        plan.par_iter()
            .map(|(input, output)| process_gff(input, output, &config))
            .collect::<Result<Vec<()>>>()
    })?;

    Ok(())
}

/// Segment one GFF file and write its CUGO table.
fn process_gff(input: &Path, output: &Path, config: &Config) -> Result<()> {
    info!("Parsing GFF file: {}", input.display());
    let rows = cugo::annotate_file(input, config)?;

    info!("Writing output to: {} ({} rows)", output.display(), rows.len());
    write_table(output, &rows)
}

fn run_context(args: ContextArgs) -> Result<()> {
    // Validate inputs
    if !args.ids.is_file() {
        bail!("Target id file not found: {}", args.ids.display());
    }
    if !args.cugo_dir.is_dir() {
        bail!("CUGO directory not found: {}", args.cugo_dir.display());
    }
    if let Some(dir) = &args.tmhmm_dir {
        if !dir.is_dir() {
            bail!("TMHMM directory not found: {}", dir.display());
        }
    }

    let mut config = ContextConfig::new();
    config.range = args.range;

    let targets = read_targets(&args.ids)?;
    if targets.is_empty() {
        bail!("No target ids in {}", args.ids.display());
    }
    info!("Extracting context for {} targets", targets.len());

    let mut extractor = ContextExtractor::new(config, args.cugo_dir, args.tmhmm_dir);
    let blocks = extractor.extract_all(&targets)?;

    info!("Writing output to: {}", args.output.display());
    write_atomically(&args.output, |writer| write_context(writer, &blocks))
}
