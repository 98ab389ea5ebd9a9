//! Innotrend Core — shared data model, configuration, errors and vector math.

pub mod config;
pub mod error;
pub mod math;
pub mod types;

pub use config::{AnalysisParams, DataPaths, PipelineConfig};
pub use error::{Error, Result};
pub use types::*;
