//! Manual backfills over explicit historical intervals

pub mod orchestrator;

pub use orchestrator::BackfillOrchestrator;
