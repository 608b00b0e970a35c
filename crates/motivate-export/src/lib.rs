//! motivate-export
//!
//! Plain-text and JSON session reports rendered from score breakdowns and
//! end-gate decisions.

pub mod error;
pub mod render;
