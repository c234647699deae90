//! Configuration and defaults for cugo.
//!
//! This module contains the configuration structures that control GFF
//! parsing and context window extraction.

/// Default GFF feature type treated as protein coding.
pub const DEFAULT_CODING_FEATURE: &str = "CDS";

/// Sentinel written when an optional value is not available.
pub const MISSING_VALUE: &str = "NA";

/// Configuration for CUGO segmentation of a GFF file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Column 3 value that marks a coding feature.
    pub coding_feature_type: String,
    /// Value used when the secondary annotation tag is absent.
    pub missing_tag: String,
    /// Underscore run collapsed to a single `_` in external ids.
    pub id_separator_run: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            coding_feature_type: DEFAULT_CODING_FEATURE.to_string(),
            missing_tag: MISSING_VALUE.to_string(),
            id_separator_run: "___".to_string(),
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a GFF feature type counts as coding.
    pub fn is_coding(&self, feature_type: &str) -> bool {
        feature_type == self.coding_feature_type
    }

    /// Normalize an external id as it appears in the annotation column.
    pub fn normalize_id(&self, raw: &str) -> String {
        if self.id_separator_run.is_empty() {
            raw.to_string()
        } else {
            raw.replace(&self.id_separator_run, "_")
        }
    }
}

/// Configuration for context window extraction.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Number of CUGO steps on either side of the target's CUGO.
    pub range: u64,
    /// File name suffix of per-genome CUGO tables.
    pub cugo_suffix: String,
    /// File name suffix of per-genome topology tables.
    pub topology_suffix: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            range: 0,
            cugo_suffix: "_cugo.tab".to_string(),
            topology_suffix: "_tmhmm_clean".to_string(),
        }
    }
}

impl ContextConfig {
    /// Create a new context config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Genome id of a target: the id with its last `_` suffix removed.
    pub fn genome_of<'a>(&self, target_id: &'a str) -> &'a str {
        match target_id.rsplit_once('_') {
            Some((genome, _)) => genome,
            None => target_id,
        }
    }

    /// File name of the CUGO table for a genome.
    pub fn cugo_file_name(&self, genome: &str) -> String {
        format!("{}{}", genome, self.cugo_suffix)
    }

    /// File name of the topology table for a genome.
    pub fn topology_file_name(&self, genome: &str) -> String {
        format!("{}{}", genome, self.topology_suffix)
    }
}
