//! Scenario definitions and the [`Check`] trait.
//!
//! A [`ScenarioDefinition`] is built once per registration through
//! [`ScenarioBuilder`], which rejects malformed shapes up front. After that
//! it is read-only: the orchestrator reads the initialize fragment, then each
//! manipulate fragment in order, then the validate fragment.

use serde::Serialize;

use crate::error::ScenarioError;
use crate::fragment::ScriptFragment;
use crate::phase::Phase;

// ---------------------------------------------------------------------------
// ScenarioDefinition
// ---------------------------------------------------------------------------

/// The three phase groups of one named check.
///
/// Invariants upheld by construction:
/// - exactly one initialize and one validate fragment,
/// - at least one manipulate fragment, in meaningful order,
/// - no fragment is blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScenarioDefinition {
    name: String,
    initialize: ScriptFragment,
    manipulate: Vec<ScriptFragment>,
    validate: ScriptFragment,
}

impl ScenarioDefinition {
    /// Start building a definition named `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ScenarioBuilder {
        ScenarioBuilder {
            name: name.into(),
            initialize: None,
            manipulate: Vec::new(),
            validate: None,
        }
    }

    /// Kebab-case scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Setup script establishing the preconditions.
    #[must_use]
    pub const fn initialize(&self) -> &ScriptFragment {
        &self.initialize
    }

    /// State-mutating scripts, to be applied strictly in this order.
    #[must_use]
    pub fn manipulate(&self) -> &[ScriptFragment] {
        &self.manipulate
    }

    /// Final-state assertions with literal expected results.
    #[must_use]
    pub const fn validate(&self) -> &ScriptFragment {
        &self.validate
    }

    /// Fragments belonging to `phase`, in order.
    #[must_use]
    pub fn phase(&self, phase: Phase) -> Vec<&ScriptFragment> {
        match phase {
            Phase::Initialize => vec![&self.initialize],
            Phase::Manipulate => self.manipulate.iter().collect(),
            Phase::Validate => vec![&self.validate],
        }
    }

    /// Number of manipulate steps (always at least one).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.manipulate.len()
    }
}

// ---------------------------------------------------------------------------
// ScenarioBuilder
// ---------------------------------------------------------------------------

/// Collects phase fragments and validates them in [`build`](Self::build).
#[derive(Clone, Debug)]
#[must_use]
pub struct ScenarioBuilder {
    name: String,
    initialize: Option<ScriptFragment>,
    manipulate: Vec<ScriptFragment>,
    validate: Option<ScriptFragment>,
}

impl ScenarioBuilder {
    /// Set the initialize fragment (replaces any earlier one).
    pub fn initialize(mut self, fragment: ScriptFragment) -> Self {
        self.initialize = Some(fragment);
        self
    }

    /// Append one manipulate step.
    pub fn manipulate(mut self, fragment: ScriptFragment) -> Self {
        self.manipulate.push(fragment);
        self
    }

    /// Append several manipulate steps, keeping their order.
    pub fn manipulate_steps(mut self, fragments: impl IntoIterator<Item = ScriptFragment>) -> Self {
        self.manipulate.extend(fragments);
        self
    }

    /// Set the validate fragment (replaces any earlier one).
    pub fn validate(mut self, fragment: ScriptFragment) -> Self {
        self.validate = Some(fragment);
        self
    }

    /// Validate the collected fragments and freeze them.
    ///
    /// # Errors
    /// Returns a [`ScenarioError`] if the name is invalid, a phase is
    /// missing, there are no manipulate steps, or any fragment is blank.
    pub fn build(self) -> Result<ScenarioDefinition, ScenarioError> {
        validate_name(&self.name)?;

        let Some(initialize) = self.initialize else {
            return Err(ScenarioError::MissingPhase {
                scenario: self.name,
                phase: Phase::Initialize,
            });
        };
        if self.manipulate.is_empty() {
            return Err(ScenarioError::NoManipulateSteps {
                scenario: self.name,
            });
        }
        let Some(validate) = self.validate else {
            return Err(ScenarioError::MissingPhase {
                scenario: self.name,
                phase: Phase::Validate,
            });
        };

        let phases = std::iter::once((Phase::Initialize, 1, &initialize))
            .chain(
                self.manipulate
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (Phase::Manipulate, i + 1, f)),
            )
            .chain(std::iter::once((Phase::Validate, 1, &validate)));
        for (phase, step, fragment) in phases {
            if fragment.is_blank() {
                return Err(ScenarioError::EmptyFragment {
                    scenario: self.name,
                    phase,
                    step,
                });
            }
        }

        Ok(ScenarioDefinition {
            name: self.name,
            initialize,
            manipulate: self.manipulate,
            validate,
        })
    }
}

fn validate_name(name: &str) -> Result<(), ScenarioError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        Some("only lowercase letters, digits and '-' are allowed")
    } else if name.starts_with('-') || name.ends_with('-') {
        Some("name cannot start or end with '-'")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(ScenarioError::InvalidName {
            name: name.to_owned(),
            reason,
        })
    })
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// A named upgrade check that can describe itself as a scenario.
///
/// Implementations should be cheap, stateless values. `define` is called
/// once, when the check is registered.
pub trait Check: Send + Sync {
    /// Unique kebab-case name.
    fn name(&self) -> &'static str;

    /// Build this check's scenario.
    ///
    /// # Errors
    /// Returns a [`ScenarioError`] when the declared scenario is malformed.
    fn define(&self) -> Result<ScenarioDefinition, ScenarioError>;

    /// [`define`](Self::define), additionally requiring the definition to
    /// carry this check's name.
    ///
    /// # Errors
    /// Propagates errors from `define`, or [`ScenarioError::NameMismatch`].
    fn definition(&self) -> Result<ScenarioDefinition, ScenarioError> {
        let definition = self.define()?;
        if definition.name() == self.name() {
            Ok(definition)
        } else {
            Err(ScenarioError::NameMismatch {
                check: self.name().to_owned(),
                defined: definition.name().to_owned(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::VersionGate;

    fn frag(text: &str) -> ScriptFragment {
        ScriptFragment::new(text)
    }

    fn complete(name: &str) -> ScenarioBuilder {
        ScenarioDefinition::builder(name)
            .initialize(frag("> CREATE TABLE t (f1 INTEGER);"))
            .manipulate(frag("> INSERT INTO t VALUES (1);"))
            .validate(frag("> SELECT * FROM t;\n1"))
    }

    #[test]
    fn builds_single_step_scenario() {
        let def = complete("single-step").build().unwrap();
        assert_eq!(def.name(), "single-step");
        assert_eq!(def.step_count(), 1);
        assert_eq!(def.phase(Phase::Initialize), [def.initialize()]);
        assert_eq!(def.phase(Phase::Validate), [def.validate()]);
    }

    #[test]
    fn manipulate_order_is_preserved() {
        let def = complete("ordered")
            .manipulate(frag("second"))
            .manipulate_steps([frag("third"), frag("fourth")])
            .build()
            .unwrap();
        let rendered: Vec<String> = def.manipulate().iter().map(ScriptFragment::render).collect();
        assert_eq!(
            rendered,
            [
                "> INSERT INTO t VALUES (1);\n",
                "second\n",
                "third\n",
                "fourth\n"
            ]
        );
    }

    #[test]
    fn accessors_are_deterministic() {
        let def = complete("determinism")
            .manipulate(ScriptFragment::gated(VersionGate::at_least(4700), "x"))
            .build()
            .unwrap();
        assert_eq!(def.initialize(), def.initialize());
        assert_eq!(def.initialize().render(), def.initialize().render());
        assert_eq!(def.manipulate(), def.manipulate());
        assert_eq!(def.clone(), def);
    }

    #[test]
    fn rejects_zero_manipulate_steps() {
        let err = ScenarioDefinition::builder("empty")
            .initialize(frag("a"))
            .validate(frag("b"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::NoManipulateSteps {
                scenario: "empty".to_owned()
            }
        );
    }

    #[test]
    fn rejects_missing_phases() {
        let err = ScenarioDefinition::builder("no-init")
            .manipulate(frag("a"))
            .validate(frag("b"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::MissingPhase {
                phase: Phase::Initialize,
                ..
            }
        ));

        let err = ScenarioDefinition::builder("no-validate")
            .initialize(frag("a"))
            .manipulate(frag("b"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::MissingPhase {
                phase: Phase::Validate,
                ..
            }
        ));
    }

    #[test]
    fn rejects_blank_fragment_with_position() {
        let err = complete("blank")
            .manipulate(frag("   \n"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::EmptyFragment {
                scenario: "blank".to_owned(),
                phase: Phase::Manipulate,
                step: 2,
            }
        );
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "Rename", "rename_table", "-lead", "trail-", "has space"] {
            let err = complete(name).build().unwrap_err();
            assert!(
                matches!(err, ScenarioError::InvalidName { .. }),
                "name {name:?} should be rejected"
            );
        }
        assert!(complete("rename-table-2").build().is_ok());
    }

    struct Mislabelled;

    impl Check for Mislabelled {
        fn name(&self) -> &'static str {
            "mislabelled"
        }

        fn define(&self) -> Result<ScenarioDefinition, ScenarioError> {
            complete("something-else").build()
        }
    }

    #[test]
    fn definition_requires_matching_name() {
        let err = Mislabelled.definition().unwrap_err();
        assert_eq!(
            err,
            ScenarioError::NameMismatch {
                check: "mislabelled".to_owned(),
                defined: "something-else".to_owned(),
            }
        );
    }

    #[test]
    fn definitions_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScenarioDefinition>();
        assert_send_sync::<Box<dyn Check>>();
    }
}
