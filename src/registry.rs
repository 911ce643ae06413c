//! Registry of checks, keyed by unique name.
//!
//! Registration is where a check's scenario gets built: [`Check::definition`]
//! runs exactly once per check and the frozen [`ScenarioDefinition`] is kept
//! behind an [`Arc`] so callers can hold it across threads.

use std::sync::Arc;

use checks_core::{Check, ScenarioDefinition, ScenarioError};
use thiserror::Error;

use crate::config::SelectionConfig;

/// Errors raised while registering or looking up checks.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two checks were registered under the same name.
    #[error("check `{name}` is already registered")]
    Duplicate {
        /// The repeated name.
        name: String,
    },

    /// A check's scenario failed to build.
    #[error("check `{name}` is malformed: {source}")]
    Definition {
        /// The check that failed.
        name: String,
        /// Why its definition was rejected.
        #[source]
        source: ScenarioError,
    },

    /// A name was requested that no registered check carries.
    #[error("unknown check `{name}` (available: {available})")]
    UnknownCheck {
        /// The requested name.
        name: String,
        /// Comma-separated registered names.
        available: String,
    },
}

/// Registered scenario definitions in registration order.
#[derive(Debug, Default)]
pub struct CheckRegistry {
    entries: Vec<Arc<ScenarioDefinition>>,
}

impl CheckRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `check`'s scenario and add it.
    ///
    /// # Errors
    /// [`RegistryError::Duplicate`] if the name is taken, or
    /// [`RegistryError::Definition`] if the scenario is malformed.
    pub fn register(&mut self, check: &dyn Check) -> Result<(), RegistryError> {
        let name = check.name();
        if self.get(name).is_some() {
            tracing::warn!(check = name, "rejected duplicate check");
            return Err(RegistryError::Duplicate {
                name: name.to_owned(),
            });
        }
        let definition = check.definition().map_err(|source| {
            tracing::warn!(check = name, error = %source, "rejected malformed check");
            RegistryError::Definition {
                name: name.to_owned(),
                source,
            }
        })?;
        tracing::debug!(
            check = name,
            manipulate_steps = definition.step_count(),
            "registered check"
        );
        self.entries.push(Arc::new(definition));
        Ok(())
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ScenarioDefinition>> {
        self.entries.iter().find(|d| d.name() == name).cloned()
    }

    /// Look up a definition by name, failing with the list of known names.
    ///
    /// # Errors
    /// [`RegistryError::UnknownCheck`] if nothing is registered as `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<ScenarioDefinition>, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::UnknownCheck {
            name: name.to_owned(),
            available: self.names().join(", "),
        })
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.name()).collect()
    }

    /// All definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ScenarioDefinition>> {
        self.entries.iter()
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply include/exclude lists.
    ///
    /// An empty include list selects every check. Exclusions win over
    /// inclusions. The result keeps registration order.
    ///
    /// # Errors
    /// [`RegistryError::UnknownCheck`] if either list names an unregistered
    /// check.
    pub fn select(
        &self,
        selection: &SelectionConfig,
    ) -> Result<Vec<Arc<ScenarioDefinition>>, RegistryError> {
        for name in selection.include.iter().chain(&selection.exclude) {
            self.resolve(name)?;
        }
        let selected: Vec<_> = self
            .entries
            .iter()
            .filter(|d| {
                selection.include.is_empty() || selection.include.iter().any(|n| n == d.name())
            })
            .filter(|d| !selection.exclude.iter().any(|n| n == d.name()))
            .cloned()
            .collect();
        tracing::info!(
            selected = selected.len(),
            registered = self.len(),
            "selected checks"
        );
        Ok(selected)
    }
}
