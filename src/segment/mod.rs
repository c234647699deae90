//! CUGO segmentation of a stream of coding features.

pub mod classify;
pub mod machine;
pub mod sizes;

pub use classify::{classify, Case, Classification, Relation};
pub use machine::{segment, Segmentation, SegmentationState};
pub use sizes::SizeAggregator;
