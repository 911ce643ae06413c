//! Execution plans: the order an orchestrator must feed fragments to the
//! driver.
//!
//! A plan flattens a [`ScenarioDefinition`] into numbered steps: initialize
//! first, then every manipulate step in declared order, then validate. Each
//! step carries the rendered script so it can be printed, serialized or
//! exported as a `.td` file.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use checks_core::{Phase, ScenarioDefinition, ScriptFragment};
use serde::Serialize;

/// One script in the plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    /// 1-based position in the whole plan.
    pub ordinal: usize,
    /// Phase this script belongs to.
    pub phase: Phase,
    /// 1-based position within the phase.
    pub step: usize,
    /// Whether the script contains version-gated blocks.
    pub gated: bool,
    /// Rendered script text.
    pub script: String,
}

impl PlannedStep {
    fn new(ordinal: usize, phase: Phase, step: usize, fragment: &ScriptFragment) -> Self {
        Self {
            ordinal,
            phase,
            step,
            gated: fragment.is_gated(),
            script: fragment.render(),
        }
    }

    /// File name used on export, e.g. `02-manipulate-1.td`.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self.phase {
            Phase::Manipulate => format!("{:02}-manipulate-{}.td", self.ordinal, self.step),
            phase => format!("{:02}-{phase}.td", self.ordinal),
        }
    }
}

/// Ordered scripts for one check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// Name of the check the plan was built from.
    pub check: String,
    /// Steps in execution order.
    pub steps: Vec<PlannedStep>,
}

impl ExecutionPlan {
    /// Flatten `definition` into execution order.
    #[must_use]
    pub fn for_scenario(definition: &ScenarioDefinition) -> Self {
        let mut steps = Vec::with_capacity(definition.step_count() + 2);
        for phase in Phase::ALL {
            for (i, fragment) in definition.phase(phase).into_iter().enumerate() {
                steps.push(PlannedStep::new(steps.len() + 1, phase, i + 1, fragment));
            }
        }
        Self {
            check: definition.name().to_owned(),
            steps,
        }
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    /// Human-readable listing: a header line per step followed by its script.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let gated = if step.gated { " (gated)" } else { "" };
            let _ = writeln!(out, "==> {}/{}{gated} <==", self.check, step.file_name());
            out.push_str(&step.script);
        }
        out
    }

    /// Write one `.td` file per step into `<dir>/<check>/`.
    ///
    /// `.td` files left by an earlier export of the same check are removed
    /// first, so the directory only ever holds the current plan. Returns the
    /// written paths in execution order.
    ///
    /// # Errors
    /// Returns any I/O error from creating the directory, removing stale
    /// scripts or writing a file.
    pub fn export(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let target = dir.join(&self.check);
        fs::create_dir_all(&target)?;
        let removed = remove_scripts(&target)?;
        if removed > 0 {
            tracing::debug!(check = %self.check, removed, "removed stale scripts");
        }
        let mut written = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let path = target.join(step.file_name());
            fs::write(&path, &step.script)?;
            written.push(path);
        }
        tracing::info!(
            check = %self.check,
            files = written.len(),
            dir = %target.display(),
            "exported plan"
        );
        Ok(written)
    }
}

/// Delete every `*.td` file directly inside `dir`. Other files are kept.
fn remove_scripts(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "td") {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
