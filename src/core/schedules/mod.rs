//! Recurring schedules in the workflow engine

pub mod manager;

pub use manager::{creation_note, search_attributes, ScheduleManager};
