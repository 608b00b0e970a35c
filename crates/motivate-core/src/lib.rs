//! motivate-core
//!
//! Pure domain types for the MI practice engine: transcript turns, technique
//! coverage, end-gate decisions, rubric categories, and score breakdowns.
//! No I/O; this is the shared vocabulary of the Motivate system.

pub mod error;
pub mod models;
