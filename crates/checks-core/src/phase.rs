//! Lifecycle phases of a check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a script fragment plays in a check.
///
/// Phases are ordered the way an orchestrator must run them: every
/// `Initialize` fragment precedes every `Manipulate` fragment, which all
/// precede `Validate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Establishes the preconditions.
    Initialize,
    /// Mutates state; there may be several, applied in declared order.
    Manipulate,
    /// Asserts the cumulative final state.
    Validate,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Self; 3] = [Self::Initialize, Self::Manipulate, Self::Validate];

    /// Lowercase name used in file names and CLI arguments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Manipulate => "manipulate",
            Self::Validate => "validate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
