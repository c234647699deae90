//! Parsers for annotation and CUGO table files.

pub mod gff;
pub mod table;
pub mod util;

pub use gff::{GffError, GffReader, Retained, Window};
pub use table::{CugoTable, TopologyTable};
