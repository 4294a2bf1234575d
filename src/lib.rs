//! Privacy-first, on-device cycle tracking core.
//!
//! The prediction engine is a pure function over the log set; persistence is
//! a single passphrase-sealed file on disk. Nothing here talks to a network.

pub mod crypto;
pub mod insights;
pub mod models;
pub mod prediction;
pub mod storage;
pub mod trend;
