//! Core types: configuration, file records, and background tasks

pub mod config;
pub mod record;
pub mod task;
