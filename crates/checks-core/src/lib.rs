//! Core contract for upgrade checks.
//!
//! A check declares three lifecycle phases as script fragments for an
//! external test driver: one initialize fragment, an ordered non-empty list
//! of manipulate fragments, and one validate fragment. This crate only
//! describes those scripts. It never parses them, never runs them, and never
//! evaluates the version gates embedded in them.

pub mod error;
pub mod fragment;
pub mod gate;
pub mod phase;
pub mod scenario;

pub use error::ScenarioError;
pub use fragment::{Block, ScriptFragment, dedent};
pub use gate::{Comparison, VersionGate};
pub use phase::Phase;
pub use scenario::{Check, ScenarioBuilder, ScenarioDefinition};
