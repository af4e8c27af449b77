//! I/O adapters for the writer and sweeper.

pub mod artifact_dir;
pub mod clock;
pub mod request_log;
pub mod store;
