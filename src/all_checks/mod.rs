//! Built-in upgrade checks.
//!
//! Every check listed in [`builtin`] is registered by [`registry`]. Adding a
//! check means adding a module here and one line to [`builtin`].

pub mod rename_table;

pub use rename_table::RenameTable;

use checks_core::Check;

use crate::registry::{CheckRegistry, RegistryError};

/// Every built-in check, in registration order.
#[must_use]
pub fn builtin() -> Vec<Box<dyn Check>> {
    vec![Box::new(RenameTable)]
}

/// A registry holding every built-in check.
///
/// # Errors
/// Returns a [`RegistryError`] if a built-in check is malformed or two
/// built-in checks share a name.
pub fn registry() -> Result<CheckRegistry, RegistryError> {
    let mut registry = CheckRegistry::new();
    for check in builtin() {
        registry.register(check.as_ref())?;
    }
    Ok(registry)
}
