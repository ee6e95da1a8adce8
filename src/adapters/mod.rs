//! External system integrations
//!
//! - [`database`] - Store ports (trait-based) and their factory
//! - [`postgresql`] - PostgreSQL implementation of the store ports
//! - [`temporal`] - Workflow engine port and its HTTP client
//!
//! The core depends only on the traits, so every adapter can be replaced by
//! an in-memory implementation in tests.

pub mod database;
pub mod postgresql;
pub mod temporal;
