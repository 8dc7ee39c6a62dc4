//! Light Maps Library
//!
//! A minimal map browser: a host engine drives an embedded map runtime over a
//! message bridge. The binary runs both sides headless, reading commands on
//! stdin and writing events as NDJSON.

pub mod headless;

// Re-export main entry point
pub use headless::runner::run_headless;
