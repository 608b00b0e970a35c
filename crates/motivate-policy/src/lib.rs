//! motivate-policy
//!
//! Turn-by-turn conversation policy for MI practice sessions: phrase
//! classification, technique coverage tracking, and the end gate that
//! decides whether a session may finish.

pub mod config;
pub mod coverage;
pub mod error;
pub mod gate;
pub mod phrase;
pub mod session;
mod text;
