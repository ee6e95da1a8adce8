//! Destination type registry

use crate::core::destinations::s3::S3BatchExportWorkflow;
use crate::core::destinations::workflow::DestinationWorkflow;
use crate::domain::{BatchExportError, Result};
use std::collections::HashMap;

/// Maps a destination type tag to the workflow that serves it
///
/// # Examples
///
/// ```
/// use batch_exports::core::destinations::DestinationRegistry;
///
/// let registry = DestinationRegistry::with_defaults();
/// assert_eq!(registry.resolve("S3").unwrap().name(), "s3-export");
/// assert!(registry.resolve("BigQuery").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DestinationRegistry {
    entries: HashMap<String, DestinationWorkflow>,
}

impl DestinationRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in destinations
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("S3", DestinationWorkflow::of::<S3BatchExportWorkflow>());
        registry
    }

    /// Register a workflow for a destination type, returning the entry it replaced
    pub fn register(
        &mut self,
        destination_type: impl Into<String>,
        workflow: DestinationWorkflow,
    ) -> Option<DestinationWorkflow> {
        let destination_type = destination_type.into();
        tracing::debug!(
            destination_type = %destination_type,
            workflow = workflow.name(),
            "Destination workflow registered"
        );
        self.entries.insert(destination_type, workflow)
    }

    /// Look up the workflow for a destination type
    ///
    /// # Errors
    ///
    /// Returns [`BatchExportError::UnknownDestinationType`] when nothing is
    /// registered for the tag.
    pub fn resolve(&self, destination_type: &str) -> Result<&DestinationWorkflow> {
        self.entries
            .get(destination_type)
            .ok_or_else(|| BatchExportError::UnknownDestinationType(destination_type.to_string()))
    }

    /// Look up a registered workflow by its workflow type name
    pub fn find_workflow(&self, name: &str) -> Option<&DestinationWorkflow> {
        self.entries.values().find(|entry| entry.name() == name)
    }

    /// Registered destination type tags, sorted
    pub fn destination_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
