//! Golden-master oracle.
//!
//! Decides whether an output tree is an exact replica of a previously
//! approved one. Text files are compared as decoded strings and produce a
//! unified diff on mismatch, everything else is compared byte for byte.

mod classification;
mod compare;
mod tree;

pub use classification::{FileClass, TEXT_EXTENSIONS, classify};
pub use compare::{ComparisonResult, Mismatch, TreeSide, compare_file, compare_trees, unified_diff};
pub use tree::{DirectoryTree, FileSetDifference, TreeScanError, list_relative_files};
