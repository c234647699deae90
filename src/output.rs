//! Output formatting for cugo results.
//!
//! This module joins per-feature rows with their final CUGO sizes and writes
//! the tab-separated CUGO table. Files are written to a temporary sibling
//! and only renamed into place once complete.

use anyhow::{bail, Context, Result};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::segment::SizeAggregator;
use crate::types::CugoRow;

/// Column names of the CUGO table, in output order.
pub const CUGO_COLUMNS: [&str; 12] = [
    "seqID",
    "parent_ID",
    "gene_start",
    "gene_end",
    "nuc_length",
    "aa_length",
    "strand",
    "COG_ID",
    "CUGO_number",
    "CUGO_start",
    "CUGO_end",
    "CUGO_size",
];

/// Attach each row's final group size.
///
/// Every row's group must have been closed by the state machine.
pub fn assemble(rows: Vec<CugoRow>, sizes: &SizeAggregator) -> Result<Vec<CugoRow>> {
    rows.into_iter()
        .map(|mut row| match sizes.size_of(row.cugo) {
            Some(size) => {
                row.size = Some(size);
                Ok(row)
            }
            None => bail!(
                "CUGO {} of feature {} was never closed",
                row.cugo,
                row.feature.id
            ),
        })
        .collect()
}

/// Write the output header.
pub fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", CUGO_COLUMNS.join("\t"))?;
    Ok(())
}

/// Format a single output line for an assembled row.
pub fn format_output_line(row: &CugoRow) -> String {
    let feature = &row.feature;
    let size = row
        .size
        .map_or_else(|| "NA".to_string(), |size| size.to_string());

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        feature.id,
        feature.parent,
        feature.start,
        feature.end,
        feature.nuc_length(),
        feature.aa_length(),
        feature.strand,
        feature.tag,
        row.cugo,
        row.start_kind,
        row.end_kind,
        size
    )
}

/// Write header and rows to any writer.
pub fn write_rows<W: Write>(writer: &mut W, rows: &[CugoRow]) -> Result<()> {
    write_header(writer)?;
    for row in rows {
        writeln!(writer, "{}", format_output_line(row))?;
    }
    Ok(())
}

/// Genome name of an annotation file: the file name without a ".gz"
/// suffix and without its last extension.
pub fn genome_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Write a CUGO table to `path`.
pub fn write_table(path: &Path, rows: &[CugoRow]) -> Result<()> {
    write_atomically(path, |writer| write_rows(writer, rows))
}

/// Write a file through a temporary sibling, renaming it into place only
/// when `fill` succeeds. On error the destination is left untouched.
pub fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(&mut temp);
        fill(&mut writer)?;
        writer.flush()?;
    }

    temp.persist(path)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    Ok(())
}
