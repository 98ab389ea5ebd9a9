//! Innotrend Analysis — principal directions of innovation per five-year bin.
//!
//! Stacks the yearly embedding archives of each bin, fits a PCA, and
//! describes every component by the bigrams of the patents most aligned
//! with it.

pub mod pca;
pub mod trends;

pub use pca::Pca;
pub use trends::{BinVectors, ComponentAnalysis, TrendExtractor};
