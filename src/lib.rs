//! cugo - colocated unidirectional gene organization (CUGO) library.
//!
//! This library groups the coding features of an ordered genome annotation
//! into CUGOs: maximal runs of consecutive, same-strand coding genes on one
//! contig. Every gene is annotated with its CUGO number, the reason its CUGO
//! starts and ends where it does, and the CUGO size.
//!
//! # Features
//!
//! - Stream GFF files (with gzip support) in a single pass
//! - Classify CUGO boundaries as contig edges or strand changes, mirrored
//!   for reverse-strand groups
//! - Write the tab-separated CUGO table atomically
//! - Extract strand-oriented CUGO context windows around target genes
//!
//! # Example
//!
//! ```ignore
//! use cugo::config::Config;
//! use cugo::output::write_table;
//! use std::path::Path;
//!
//! let rows = cugo::annotate_file(Path::new("genome.gff"), &Config::default())?;
//! write_table(Path::new("genome_cugo.tab"), &rows)?;
//! ```

pub mod config;
pub mod context;
pub mod output;
pub mod parser;
pub mod segment;
pub mod types;

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::BufRead;
use std::path::Path;

pub use config::{Config, ContextConfig};
pub use parser::{GffReader, Window};
pub use segment::{Segmentation, SegmentationState, SizeAggregator};
pub use types::{BoundaryKind, CugoRow, FeatureRecord, Strand};

/// Segment a GFF stream and return the assembled CUGO rows in input order.
pub fn annotate<R: BufRead>(reader: R, config: &Config) -> Result<Vec<CugoRow>> {
    let gff = GffReader::new(reader, config.clone());
    let segmentation = segment::segment(gff.windows())?;

    if segmentation.skipped_lines > 0 {
        warn!(
            "Skipped {} lines without {} tab-separated fields",
            segmentation.skipped_lines,
            parser::gff::GFF_FIELD_COUNT
        );
    }
    info!(
        "Assigned {} coding features to {} CUGOs",
        segmentation.rows.len(),
        segmentation.sizes.len()
    );

    output::assemble(segmentation.rows, &segmentation.sizes)
}

/// Segment a GFF file (supports .gz).
pub fn annotate_file(path: &Path, config: &Config) -> Result<Vec<CugoRow>> {
    let reader = parser::util::open_buffered(path)?;
    annotate(reader, config).with_context(|| format!("Failed to process {}", path.display()))
}
