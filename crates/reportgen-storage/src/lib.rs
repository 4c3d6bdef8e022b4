//! reportgen-storage
//!
//! Report persistence and artifact upload. Thin wrappers around the AWS S3
//! SDK, plus an in-process repository for tests and local runs.

pub mod client;
pub mod error;
pub mod memory;
pub mod objects;
pub mod repository;
pub mod s3_repository;
pub mod upload;

pub use crate::memory::MemoryReportRepository;
pub use crate::repository::ReportRepository;
pub use crate::s3_repository::S3ReportRepository;
pub use crate::upload::{S3Uploader, Uploader};
