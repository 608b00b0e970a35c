//! motivate-cli library root.
//!
//! Exposes configuration loading and the command layer to the `motivate`
//! binary and to integration tests.

pub mod commands;
pub mod config;
