//! Before/after script execution
//!
//! The config lists commands run around the merge:
//! - before: verification gate, every command must exit 0 or nothing is merged
//! - after: notification/deployment, failures are reported only

pub mod executor;
pub mod lifecycle;

pub use executor::{RunReport, ScriptOutcome, ScriptRunner};
pub use lifecycle::{ScriptContext, ScriptPhase};
