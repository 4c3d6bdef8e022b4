//! reportgen-core
//!
//! Pure domain types, the artifact generator capability, and S3 key
//! conventions. No AWS SDK dependency; this is the shared vocabulary of the
//! report generation pipeline.

pub mod error;
pub mod generator;
pub mod models;
pub mod s3_keys;
