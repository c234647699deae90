//! Readers for headered tab-separated tables consumed by context extraction.
//!
//! The CUGO table is the file written by `cugo parse`; the topology table is
//! any headered table whose first column holds the feature id.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::warn;
use std::io::BufRead;
use std::path::Path;

use crate::parser::util::open_buffered;
use crate::types::Strand;

/// Read a headered tab-separated file into (header, rows).
///
/// Blank lines are ignored; every other row must have as many cells as the
/// header.
fn read_tsv<R: BufRead>(reader: R, what: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut lines = reader.lines().enumerate();

    let header: Vec<String> = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.with_context(|| format!("Failed to read {} header", what))?;
                let line = line.trim_end_matches(['\r', '\n']);
                if !line.is_empty() {
                    break line.split('\t').map(str::to_string).collect();
                }
            }
            None => bail!("{} is empty", what),
        }
    };

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let line = line.with_context(|| format!("Failed to read {} line", what))?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let cells: Vec<String> = line.split('\t').map(str::to_string).collect();
        if cells.len() != header.len() {
            bail!(
                "{} line {} has {} columns, expected {}",
                what,
                idx + 1,
                cells.len(),
                header.len()
            );
        }
        rows.push(cells);
    }

    Ok((header, rows))
}

fn column_index(header: &[String], name: &str, what: &str) -> Result<usize> {
    header
        .iter()
        .position(|col| col == name)
        .with_context(|| format!("{} has no '{}' column", what, name))
}

/// A CUGO table held in memory, with its key columns located.
#[derive(Debug, Clone)]
pub struct CugoTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    cugo_numbers: Vec<u64>,
    id_col: usize,
    parent_col: usize,
    strand_col: usize,
}

impl CugoTable {
    /// Load a CUGO table from a file (supports .gz).
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_buffered(path)?;
        Self::from_reader(reader)
            .with_context(|| format!("Failed to parse CUGO table {}", path.display()))
    }

    /// Parse a CUGO table from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let (columns, rows) = read_tsv(reader, "CUGO table")?;
        let id_col = column_index(&columns, "seqID", "CUGO table")?;
        let parent_col = column_index(&columns, "parent_ID", "CUGO table")?;
        let strand_col = column_index(&columns, "strand", "CUGO table")?;
        let cugo_col = column_index(&columns, "CUGO_number", "CUGO table")?;

        let cugo_numbers = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                row[cugo_col].parse::<u64>().with_context(|| {
                    format!(
                        "Invalid CUGO_number '{}' on data row {}",
                        row[cugo_col],
                        idx + 1
                    )
                })
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(CugoTable {
            columns,
            rows,
            cugo_numbers,
            id_col,
            parent_col,
            strand_col,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index of the feature with the given id; exactly one must match.
    pub fn find(&self, id: &str) -> Result<usize> {
        let mut matches = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[self.id_col] == id)
            .map(|(idx, _)| idx);

        match (matches.next(), matches.next()) {
            (Some(idx), None) => Ok(idx),
            (None, _) => bail!("Feature '{}' not found in CUGO table", id),
            (Some(_), Some(_)) => bail!("Feature '{}' occurs more than once in CUGO table", id),
        }
    }

    pub fn id(&self, row: usize) -> &str {
        &self.rows[row][self.id_col]
    }

    pub fn parent(&self, row: usize) -> &str {
        &self.rows[row][self.parent_col]
    }

    pub fn cugo(&self, row: usize) -> u64 {
        self.cugo_numbers[row]
    }

    pub fn strand(&self, row: usize) -> Result<Strand> {
        let value = &self.rows[row][self.strand_col];
        value
            .parse()
            .with_context(|| format!("Invalid strand '{}' for feature {}", value, self.id(row)))
    }

    /// Left-join a topology table on feature id, appending its columns.
    ///
    /// Rows without a topology entry get empty cells.
    pub fn join(&mut self, topology: &TopologyTable) {
        let width = topology.columns.len();
        self.columns.extend(topology.columns.iter().cloned());
        for row in &mut self.rows {
            match topology.get(&row[self.id_col]) {
                Some(values) => row.extend(values.iter().cloned()),
                None => row.extend(std::iter::repeat(String::new()).take(width)),
            }
        }
    }
}

/// Per-feature annotations keyed by the table's first column.
#[derive(Debug, Clone, Default)]
pub struct TopologyTable {
    /// Names of the non-key columns.
    pub columns: Vec<String>,
    entries: IndexMap<String, Vec<String>>,
}

impl TopologyTable {
    /// Load a topology table from a file (supports .gz).
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_buffered(path)?;
        Self::from_reader(reader)
            .with_context(|| format!("Failed to parse topology table {}", path.display()))
    }

    /// Parse a topology table from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let (header, rows) = read_tsv(reader, "topology table")?;
        let columns = header.into_iter().skip(1).collect();

        let mut entries = IndexMap::with_capacity(rows.len());
        for mut row in rows {
            let values = row.split_off(1);
            let key = row.swap_remove(0);
            if entries.contains_key(&key) {
                warn!("Duplicate topology entry for {}; keeping the first", key);
                continue;
            }
            entries.insert(key, values);
        }

        Ok(TopologyTable { columns, entries })
    }

    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.entries.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
