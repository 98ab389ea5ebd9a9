//! Runtime orchestrator — runs the pipeline stages against the data directory.
//!
//! Each stage reads the previous stage's flat files and writes its own:
//! embed (patents → yearly vector archives), extract (archives → component
//! table), label (component table → technology terms) and narrate
//! (alignment table → monthly narratives).

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
