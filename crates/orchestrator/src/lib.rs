//! Orchestration of analysis jobs.
//!
//! Owns the run of a single job: stage sequencing, progress bookkeeping,
//! artifact generation, and the events that make a run observable from
//! the outside.

pub mod artifacts;
pub mod error;
pub mod pipeline;
pub mod renderer;

pub use artifacts::ArtifactStore;
pub use error::{OrchestratorError, Result};
pub use pipeline::AnalysisPipeline;
pub use renderer::{HttpRenderer, ReportRenderer};
