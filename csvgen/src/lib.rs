//! CSV artifact generation with time-based expiry.
//!
//! Requests carrying tabular JSON are written to uniquely named CSV files in a
//! shared upload directory; a background sweeper deletes files older than the
//! retention threshold. The two sides share nothing but the directory:
//!
//! - **[`core`]**: Pure, deterministic logic (validation, encoding, naming,
//!   expiry arithmetic). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (artifact store, sweep directory,
//!   request log files). Isolated behind traits where tests need fakes.
//!
//! [`writer`] and [`sweeper`] coordinate core logic with I/O to implement the
//! two service components.

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod sweeper;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod writer;
