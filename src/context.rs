//! Genomic context extraction around target features.
//!
//! Given a CUGO table, the context of a target is every feature on the
//! target's contig whose CUGO lies within a fixed number of CUGO steps of the
//! target's own. The window is oriented along the target's strand and
//! indexed relative to the target (position 0).

use ahash::AHashMap;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::ContextConfig;
use crate::parser::table::{CugoTable, TopologyTable};
use crate::parser::util::open_buffered;
use crate::types::Strand;

/// The context window of one target.
#[derive(Debug, Clone)]
pub struct ContextBlock {
    pub target: String,
    /// Field names, one output row each.
    pub fields: Vec<String>,
    /// Relative position -> field values, in strand-relative order.
    pub positions: IndexMap<i64, Vec<String>>,
}

/// Select the context window of `target` from a loaded table.
pub fn extract_window(table: &CugoTable, target: &str, range: u64) -> Result<ContextBlock> {
    let target_row = table.find(target)?;
    let target_cugo = table.cugo(target_row);
    let target_parent = table.parent(target_row);
    let target_strand = table.strand(target_row)?;

    let mut selected: Vec<usize> = (0..table.len())
        .filter(|&row| {
            table.parent(row) == target_parent && table.cugo(row).abs_diff(target_cugo) <= range
        })
        .collect();

    if target_strand == Strand::Negative {
        selected.reverse();
    }

    // The target always satisfies the filter, so it is present
    let offset = selected
        .iter()
        .position(|&row| row == target_row)
        .unwrap_or_default() as i64;

    let positions = selected
        .into_iter()
        .enumerate()
        .map(|(idx, row)| (idx as i64 - offset, table.rows[row].clone()))
        .collect();

    Ok(ContextBlock {
        target: target.to_string(),
        fields: table.columns.clone(),
        positions,
    })
}

/// Read target ids, one per line; blank lines are ignored.
pub fn read_targets(path: &Path) -> Result<Vec<String>> {
    let reader = open_buffered(path)?;
    let mut targets = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read target id list")?;
        let id = line.trim();
        if !id.is_empty() {
            targets.push(id.to_string());
        }
    }
    Ok(targets)
}

/// Resolves targets against per-genome CUGO tables, loading each genome once.
pub struct ContextExtractor {
    config: ContextConfig,
    cugo_dir: PathBuf,
    topology_dir: Option<PathBuf>,
    tables: AHashMap<String, CugoTable>,
}

impl ContextExtractor {
    pub fn new(config: ContextConfig, cugo_dir: PathBuf, topology_dir: Option<PathBuf>) -> Self {
        ContextExtractor {
            config,
            cugo_dir,
            topology_dir,
            tables: AHashMap::new(),
        }
    }

    /// Number of genome tables loaded so far.
    pub fn genomes_loaded(&self) -> usize {
        self.tables.len()
    }

    fn load(&self, genome: &str) -> Result<CugoTable> {
        let cugo_path = self.cugo_dir.join(self.config.cugo_file_name(genome));
        debug!("Loading CUGO table {}", cugo_path.display());
        let mut table = CugoTable::from_path(&cugo_path)
            .with_context(|| format!("No usable CUGO table for genome {}", genome))?;

        if let Some(dir) = &self.topology_dir {
            let topology_path = dir.join(self.config.topology_file_name(genome));
            debug!("Loading topology table {}", topology_path.display());
            let topology = TopologyTable::from_path(&topology_path)
                .with_context(|| format!("No usable topology table for genome {}", genome))?;
            table.join(&topology);
        }

        Ok(table)
    }

    /// Extract the context window of one target.
    pub fn extract(&mut self, target: &str) -> Result<ContextBlock> {
        let genome = self.config.genome_of(target).to_string();
        if !self.tables.contains_key(&genome) {
            let table = self.load(&genome)?;
            self.tables.insert(genome.clone(), table);
        }
        let table = &self.tables[&genome];
        extract_window(table, target, self.config.range)
            .with_context(|| format!("Failed to extract context of {}", target))
    }

    /// Extract every target; the first failure aborts.
    pub fn extract_all(&mut self, targets: &[String]) -> Result<Vec<ContextBlock>> {
        let blocks = targets
            .iter()
            .map(|target| self.extract(target))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Extracted {} context windows from {} genomes",
            blocks.len(),
            self.genomes_loaded()
        );
        Ok(blocks)
    }
}

/// Write context blocks as one wide table.
///
/// Columns are every relative position seen in any block, ascending; each
/// block contributes one row per field, with empty cells at positions its
/// window does not reach.
pub fn write_context<W: Write>(writer: &mut W, blocks: &[ContextBlock]) -> Result<()> {
    let positions: BTreeSet<i64> = blocks
        .iter()
        .flat_map(|block| block.positions.keys().copied())
        .collect();

    write!(writer, "feat_type")?;
    for position in &positions {
        write!(writer, "\t{}", position)?;
    }
    writeln!(writer)?;

    for block in blocks {
        for (field_idx, field) in block.fields.iter().enumerate() {
            write!(writer, "{}", field)?;
            for position in &positions {
                let cell = block
                    .positions
                    .get(position)
                    .and_then(|values| values.get(field_idx))
                    .map_or("", String::as_str);
                write!(writer, "\t{}", cell)?;
            }
            writeln!(writer)?;
        }
    }

    Ok(())
}
