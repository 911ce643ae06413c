//! Version gates carried inside script fragments.
//!
//! A gate is a predicate over the version of the environment a fragment runs
//! in, written in the test driver's `$[version>=4700]` syntax. Gates here are
//! pure data: the external executor decides whether a gated block runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric comparison operator of a [`VersionGate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
}

impl Comparison {
    /// Operator as written in the driver's gate syntax.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A predicate on the environment version, e.g. `version>=4700`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionGate {
    /// How the environment version is compared.
    pub comparison: Comparison,
    /// The version marker compared against.
    pub threshold: u32,
}

impl VersionGate {
    /// Create a gate from its parts.
    #[must_use]
    pub const fn new(comparison: Comparison, threshold: u32) -> Self {
        Self {
            comparison,
            threshold,
        }
    }

    /// `version>=threshold`, the common "only on newer versions" gate.
    #[must_use]
    pub const fn at_least(threshold: u32) -> Self {
        Self::new(Comparison::GreaterOrEqual, threshold)
    }

    /// `version<threshold`.
    #[must_use]
    pub const fn below(threshold: u32) -> Self {
        Self::new(Comparison::Less, threshold)
    }

    /// The `$[...]` prefix placed in front of a gated directive.
    #[must_use]
    pub fn directive_prefix(&self) -> String {
        format!("$[{self}]")
    }
}

impl fmt::Display for VersionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "version{}{}", self.comparison, self.threshold)
    }
}
