//! reportgen-worker
//!
//! Configuration and wiring for the report generation worker binary.

pub mod app;
pub mod config;
pub mod error;
