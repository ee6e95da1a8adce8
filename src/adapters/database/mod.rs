//! Storage abstraction layer
//!
//! Trait-based ports for the relational store. [`factory::create_stores`]
//! builds the PostgreSQL implementation from configuration.

pub mod factory;
pub mod traits;

pub use factory::create_stores;
pub use traits::{BatchExportStore, RunStatusUpdate, RunStore};
