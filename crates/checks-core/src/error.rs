//! Construction errors for scenario definitions.
//!
//! A malformed definition is a configuration error of the check that declared
//! it. It is reported when the check is registered, never deferred until an
//! executor tries to run the scripts.

use thiserror::Error;

use crate::phase::Phase;

/// Reasons a [`ScenarioDefinition`](crate::ScenarioDefinition) cannot be built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The scenario name is empty or not lowercase kebab-case.
    #[error("invalid scenario name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A single-fragment phase was never supplied.
    #[error("scenario `{scenario}` has no {phase} fragment")]
    MissingPhase {
        /// Scenario being built.
        scenario: String,
        /// The phase that is missing.
        phase: Phase,
    },

    /// The manipulate sequence is empty.
    #[error("scenario `{scenario}` declares no manipulate steps; at least one is required")]
    NoManipulateSteps {
        /// Scenario being built.
        scenario: String,
    },

    /// A fragment contains no directives at all.
    #[error("scenario `{scenario}` has an empty {phase} fragment (step {step})")]
    EmptyFragment {
        /// Scenario being built.
        scenario: String,
        /// Phase the fragment belongs to.
        phase: Phase,
        /// 1-based position within the phase.
        step: usize,
    },

    /// A check produced a definition under a different name than it reports.
    #[error("check `{check}` defined a scenario named `{defined}`")]
    NameMismatch {
        /// Name reported by the check.
        check: String,
        /// Name carried by the definition.
        defined: String,
    },
}
