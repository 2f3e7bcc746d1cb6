//! # Pairwise Alignment
//!
//! One-to-one matching of the samples of two spectra within a tolerance
//! window, plus the utilities used to score an alignment (weighted intensity
//! matrix, cosine similarity, explained intensity).
//!
//! ```rust
//! use mzmerge::align::{align, AlignmentSummary};
//! use mzmerge::spectrum::Spectrum;
//! use mzmerge::tolerance::ToleranceWindow;
//!
//! let a = Spectrum::new(vec![100.0, 150.0, 200.0], vec![10.0, 5.0, 1.0])?;
//! let b = Spectrum::new(vec![100.004, 250.0], vec![8.0, 2.0])?;
//! let pairs = align(&a, &b, ToleranceWindow::absolute_only(0.01)?);
//!
//! let summary = AlignmentSummary::from_pairs(&pairs);
//! assert_eq!(pairs.len(), 4);
//! assert_eq!(summary.matched, 1);
//! # Ok::<(), mzmerge::MergeError>(())
//! ```

mod aligner;
mod similarity;

#[cfg(test)]
mod tests;

pub use aligner::{
    align, align_modification_aware, align_with_offset, crop_to_overlap, remove_unaligned,
    AlignedPair,
};
pub use similarity::{cosine_similarity, intensity_matrix_weighted, AlignmentSummary, SimilarityWeights};
