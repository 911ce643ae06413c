use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use checks::Phase;
use checks::config::Config;
use checks::format::OutputFormat;
use checks::plan::ExecutionPlan;
use checks::registry::CheckRegistry;

#[derive(Serialize)]
struct CheckSummary<'a> {
    name: &'a str,
    manipulate_steps: usize,
    gated_steps: usize,
}

/// Print every registered check.
pub fn list(registry: &CheckRegistry, format: OutputFormat) -> Result<()> {
    let summaries: Vec<_> = registry
        .iter()
        .map(|d| CheckSummary {
            name: d.name(),
            manipulate_steps: d.step_count(),
            gated_steps: d.manipulate().iter().filter(|f| f.is_gated()).count(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", format.serialize(&summaries)?),
        OutputFormat::Text => {
            for s in &summaries {
                println!(
                    "{}  ({} manipulate steps, {} gated)",
                    s.name, s.manipulate_steps, s.gated_steps
                );
            }
        }
    }
    Ok(())
}

/// Print a check's scripts: the whole plan, one phase, or one step of it.
pub fn show(
    registry: &CheckRegistry,
    name: &str,
    phase: Option<Phase>,
    step: Option<usize>,
) -> Result<()> {
    let definition = registry.resolve(name)?;
    let Some(phase) = phase else {
        print!("{}", ExecutionPlan::for_scenario(&definition).render_text());
        return Ok(());
    };

    let fragments = definition.phase(phase);
    if let Some(k) = step {
        let fragment = k
            .checked_sub(1)
            .and_then(|i| fragments.get(i))
            .with_context(|| {
                format!(
                    "{name} has {} {phase} step(s); step {k} does not exist",
                    fragments.len()
                )
            })?;
        print!("{}", fragment.render());
        return Ok(());
    }

    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", fragment.render());
    }
    Ok(())
}

/// Print the execution plan for one check.
pub fn plan(registry: &CheckRegistry, name: &str, format: OutputFormat) -> Result<()> {
    let definition = registry.resolve(name)?;
    let plan = ExecutionPlan::for_scenario(&definition);
    match format {
        OutputFormat::Json => println!("{}", format.serialize(&plan)?),
        OutputFormat::Text => print!("{}", plan.render_text()),
    }
    Ok(())
}

/// Write `.td` files for the named checks, or for the configured selection.
pub fn export(
    registry: &CheckRegistry,
    config: &Config,
    names: &[String],
    out: Option<PathBuf>,
) -> Result<()> {
    let definitions = if names.is_empty() {
        registry.select(&config.checks)?
    } else {
        names
            .iter()
            .map(|n| registry.resolve(n))
            .collect::<Result<Vec<_>, _>>()?
    };
    let dir = out.unwrap_or_else(|| config.export.dir.clone());

    for definition in &definitions {
        let written = ExecutionPlan::for_scenario(definition)
            .export(&dir)
            .with_context(|| {
                format!(
                    "Failed to export check '{}' to {}",
                    definition.name(),
                    dir.display()
                )
            })?;
        for path in written {
            println!("{}", path.display());
        }
    }
    Ok(())
}
