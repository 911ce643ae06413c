//! upgrade-checks library crate.
//!
//! The primary interface is the `checks` binary. This crate holds the
//! built-in checks, the registry they are collected in, execution plans and
//! configuration, so integration tests (and an orchestrator embedding the
//! library) can use them without going through the CLI. The check contract
//! itself lives in `checks-core` and is re-exported here.

pub mod all_checks;
pub mod config;
pub mod format;
pub mod plan;
pub mod registry;

pub use checks_core::{
    Block, Check, Comparison, Phase, ScenarioBuilder, ScenarioDefinition, ScenarioError,
    ScriptFragment, VersionGate,
};

// Private modules only used by the binary, not re-exported:
// commands, telemetry
