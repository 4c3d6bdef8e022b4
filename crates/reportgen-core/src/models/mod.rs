pub mod artifact;
pub mod report;
pub mod request;
pub mod team;
