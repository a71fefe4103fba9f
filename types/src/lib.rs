//! Shared configuration types for arenalog.
//!
//! Kept free of parsing logic so that front-ends can read and write
//! parser settings without pulling in the core crate.

mod config;

pub use config::{DEFAULT_YEAR, LogFormat, ParserConfig};
