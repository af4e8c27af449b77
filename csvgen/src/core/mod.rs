//! Deterministic, pure logic shared by the writer and sweeper.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and explicit timestamps and return deterministic outputs suitable for
//! tests.

pub mod encode;
pub mod expiry;
pub mod naming;
pub mod request;
