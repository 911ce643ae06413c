//! Shared test helpers for check integration tests.
//!
//! [`ToyTestdrive`] is a tiny stand-in for the external executor. It knows
//! just enough of the driver syntax (`> ` commands with expected rows,
//! `postgres-execute` blocks, `$[version..]` gates, `#` comments) and just
//! enough SQL (single-column integer tables, renames, owner changes,
//! `SELECT DISTINCT` materialized views) to replay the built-in checks.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Output};

use checks::ScenarioDefinition;
use checks::plan::ExecutionPlan;

// ---------------------------------------------------------------------------
// Database model
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Table {
    owner: String,
    rows: Vec<i64>,
}

#[derive(Debug, Clone, Copy)]
enum Relation {
    Table(usize),
    /// `SELECT DISTINCT` over the table with this index.
    DistinctView(usize),
}

#[derive(Debug, Default)]
struct Db {
    tables: Vec<Table>,
    names: HashMap<String, Relation>,
}

impl Db {
    fn table_index(&self, name: &str) -> Result<usize, String> {
        match self.names.get(name) {
            Some(Relation::Table(idx)) => Ok(*idx),
            Some(Relation::DistinctView(_)) => Err(format!("{name} is a view, not a table")),
            None => Err(format!("unknown table {name}")),
        }
    }

    fn claim_name(&mut self, name: &str, relation: Relation) -> Result<(), String> {
        if self.names.contains_key(name) {
            return Err(format!("relation {name} already exists"));
        }
        self.names.insert(name.to_owned(), relation);
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), String> {
        let statement = statement.trim().trim_end_matches(';');
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        match tokens.as_slice() {
            ["CREATE", "TABLE", name, ..] => {
                self.tables.push(Table {
                    owner: "default_role".to_owned(),
                    rows: Vec::new(),
                });
                let idx = self.tables.len() - 1;
                self.claim_name(name, Relation::Table(idx))
            }
            ["CREATE", "MATERIALIZED", "VIEW", view, "AS", "SELECT", "DISTINCT", "f1", "FROM", source] => {
                let idx = self.table_index(source)?;
                self.claim_name(view, Relation::DistinctView(idx))
            }
            ["INSERT", "INTO", name, "VALUES", value] => {
                let value: i64 = value
                    .trim_matches(|c: char| c == '(' || c == ')')
                    .parse::<i64>()
                    .map_err(|e| format!("bad value {value}: {e}"))?;
                let idx = self.table_index(name)?;
                self.tables[idx].rows.push(value);
                Ok(())
            }
            ["ALTER", "TABLE", from, "RENAME", "TO", to] => {
                let idx = self.table_index(from)?;
                self.claim_name(to, Relation::Table(idx))?;
                self.names.remove(*from);
                Ok(())
            }
            ["ALTER", "TABLE", name, "OWNER", "TO", owner] => {
                let idx = self.table_index(name)?;
                self.tables[idx].owner = (*owner).to_owned();
                Ok(())
            }
            _ => Err(format!("unsupported statement: {statement}")),
        }
    }

    fn select(&self, statement: &str) -> Result<Vec<i64>, String> {
        let statement = statement.trim().trim_end_matches(';');
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let ["SELECT", "*", "FROM", name] = tokens.as_slice() else {
            return Err(format!("unsupported query: {statement}"));
        };
        match self.names.get(*name) {
            Some(Relation::Table(idx)) => Ok(self.tables[*idx].rows.clone()),
            Some(Relation::DistinctView(idx)) => {
                let mut rows = self.tables[*idx].rows.clone();
                rows.sort_unstable();
                rows.dedup();
                Ok(rows)
            }
            None => Err(format!("unknown relation {name}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Replays driver scripts against an in-memory database at a fixed version.
#[derive(Debug)]
pub struct ToyTestdrive {
    version: u32,
    db: Db,
    /// Gated directives skipped because their gate did not hold.
    pub skipped: usize,
    /// Queries whose results matched the expected rows.
    pub verified: usize,
}

impl ToyTestdrive {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            db: Db::default(),
            skipped: 0,
            verified: 0,
        }
    }

    /// Owner of the table currently named `name`.
    pub fn owner(&self, name: &str) -> Option<&str> {
        let idx = self.db.table_index(name).ok()?;
        Some(self.db.tables[idx].owner.as_str())
    }

    /// Run one script. Stops at the first failing directive.
    pub fn run(&mut self, script: &str) -> Result<(), String> {
        let lines: Vec<&str> = script.lines().collect();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (enabled, directive) = self.strip_gate(line)?;
            let mut body = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() && !is_directive(lines[i]) {
                body.push(lines[i]);
                i += 1;
            }
            if !enabled {
                self.skipped += 1;
                continue;
            }

            if let Some(sql) = directive.strip_prefix("> ") {
                self.command(sql, &body)?;
            } else if let Some(args) = directive.strip_prefix("postgres-execute ") {
                if !args.starts_with("connection=postgres://") {
                    return Err(format!("bad postgres-execute arguments: {args}"));
                }
                for statement in body {
                    self.db.execute(statement)?;
                }
            } else {
                return Err(format!("unknown directive: {directive}"));
            }
        }
        Ok(())
    }

    fn command(&mut self, sql: &str, expected: &[&str]) -> Result<(), String> {
        if !sql.starts_with("SELECT") {
            if !expected.is_empty() {
                return Err(format!("unexpected output lines after {sql}"));
            }
            return self.db.execute(sql);
        }
        let expected: Vec<i64> = expected
            .iter()
            .map(|row| row.trim().parse::<i64>().map_err(|e| format!("bad row {row}: {e}")))
            .collect::<Result<_, _>>()?;
        let actual = self.db.select(sql)?;
        if actual != expected {
            return Err(format!("{sql}: expected {expected:?}, got {actual:?}"));
        }
        self.verified += 1;
        Ok(())
    }

    fn strip_gate<'a>(&self, line: &'a str) -> Result<(bool, &'a str), String> {
        let Some(rest) = line.strip_prefix("$[version") else {
            return Ok((true, line));
        };
        let (predicate, directive) = rest
            .split_once("] ")
            .ok_or_else(|| format!("malformed gate: {line}"))?;
        let (op, threshold) = ["<=", ">=", "==", "!=", "<", ">"]
            .iter()
            .find_map(|op| predicate.strip_prefix(*op).map(|n| (*op, n)))
            .ok_or_else(|| format!("malformed gate: {line}"))?;
        let threshold = threshold
            .parse::<u32>()
            .map_err(|e| format!("malformed gate threshold {threshold}: {e}"))?;
        let v = self.version;
        let enabled = match op {
            "<=" => v <= threshold,
            ">=" => v >= threshold,
            "==" => v == threshold,
            "!=" => v != threshold,
            "<" => v < threshold,
            _ => v > threshold,
        };
        Ok((enabled, directive))
    }
}

fn is_directive(line: &str) -> bool {
    line.starts_with("> ") || line.starts_with('$') || line.starts_with('#')
}

/// Run a whole plan in order at `version`.
pub fn replay(definition: &ScenarioDefinition, version: u32) -> Result<ToyTestdrive, String> {
    let mut driver = ToyTestdrive::new(version);
    for step in ExecutionPlan::for_scenario(definition).steps() {
        driver
            .run(&step.script)
            .map_err(|e| format!("{}: {e}", step.file_name()))?;
    }
    Ok(driver)
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Run the `checks` binary with a config path that does not exist, so the
/// defaults apply regardless of the working directory.
pub fn checks_cmd(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_checks"))
        .arg("--config")
        .arg(dir.join("absent.toml"))
        .args(args)
        .current_dir(dir)
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .output()
        .expect("failed to run checks")
}
