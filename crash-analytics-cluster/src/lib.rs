//! Thread-distance metrics and hierarchical clustering over the resulting
//! distance matrix.
//!
//! [`distance::distance`] computes one of four pairwise metrics between two
//! threads' frame sequences; [`matrix::DistanceMatrix`] assembles an `n x n`
//! matrix over a batch of threads, either sequentially or via `rayon`-backed
//! row bands merged back with [`matrix::DistanceMatrix::merge`];
//! [`dendrogram::Dendrogram`] runs average-linkage agglomerative clustering
//! over that matrix and supports cutting it into flat clusters at a given
//! distance threshold.

#![warn(missing_docs)]

pub mod dendrogram;
pub mod distance;
pub mod matrix;

pub use dendrogram::{Dendrogram, Linkage};
pub use distance::{distance, DistanceType};
pub use matrix::{DistanceMatrix, MergeError, Part};
