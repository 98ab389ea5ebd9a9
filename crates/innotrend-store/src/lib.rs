//! Innotrend Store — flat-file persistence for every pipeline stage.
//!
//! The pipeline keeps no database: each stage reads the previous stage's
//! CSV or ZIP output and writes its own.

pub mod alignment;
pub mod archive;
pub mod patents;
pub mod results;

pub use alignment::load_alignments;
pub use archive::{read_year_archive, write_year_archive, ID_COLUMN};
pub use patents::PatentTable;
pub use results::{read_results, write_results};
