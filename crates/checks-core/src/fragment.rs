//! Script fragments handed to the external test driver.
//!
//! A [`ScriptFragment`] is opaque text: this crate never looks inside the
//! directives. The only structure it knows about is the split into
//! [`Block`]s, some of which carry a [`VersionGate`] that the executor
//! evaluates before running them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gate::VersionGate;

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One contiguous run of directives inside a fragment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Always run.
    Unconditional {
        /// Dedented directive text.
        text: String,
    },
    /// Run only when the executor finds `gate` satisfied.
    Gated {
        /// Predicate on the environment version.
        gate: VersionGate,
        /// Dedented directive text; the gate applies to its first directive.
        text: String,
    },
}

impl Block {
    /// The directive text without any gate prefix.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Unconditional { text } | Self::Gated { text, .. } => text,
        }
    }

    /// The gate, if this block is conditional.
    #[must_use]
    pub const fn gate(&self) -> Option<&VersionGate> {
        match self {
            Self::Unconditional { .. } => None,
            Self::Gated { gate, .. } => Some(gate),
        }
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Unconditional { text } => {
                out.push_str(text);
                ensure_newline(out);
            }
            Self::Gated { gate, text } => {
                out.push_str(&gate.directive_prefix());
                out.push(' ');
                out.push_str(text);
                ensure_newline(out);
                // The driver reads a gated directive's input up to the next
                // blank line.
                if !out.ends_with("\n\n") {
                    out.push('\n');
                }
            }
        }
    }
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

// ---------------------------------------------------------------------------
// ScriptFragment
// ---------------------------------------------------------------------------

/// Opaque directive text for one phase step, possibly with gated blocks.
///
/// Text passed in is dedented and loses a single leading newline, so
/// fragments can be written as indented raw string literals:
///
/// ```
/// use checks_core::ScriptFragment;
///
/// let fragment = ScriptFragment::new(
///     r"
///     > CREATE TABLE t (f1 INTEGER);
///     > INSERT INTO t VALUES (1);
///     ",
/// );
/// assert_eq!(
///     fragment.render(),
///     "> CREATE TABLE t (f1 INTEGER);\n> INSERT INTO t VALUES (1);\n"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptFragment {
    blocks: Vec<Block>,
}

impl ScriptFragment {
    /// A fragment consisting of one unconditional block.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::default().then(text)
    }

    /// A fragment whose first block is gated.
    #[must_use]
    pub fn gated(gate: VersionGate, text: &str) -> Self {
        Self::default().then_gated(gate, text)
    }

    /// Append an unconditional block.
    #[must_use]
    pub fn then(mut self, text: &str) -> Self {
        self.blocks.push(Block::Unconditional {
            text: normalize(text),
        });
        self
    }

    /// Append a block the executor runs only when `gate` holds.
    #[must_use]
    pub fn then_gated(mut self, gate: VersionGate, text: &str) -> Self {
        self.blocks.push(Block::Gated {
            gate,
            text: normalize(text),
        });
        self
    }

    /// Blocks in declared order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Gates carried by this fragment, in block order.
    pub fn gates(&self) -> impl Iterator<Item = &VersionGate> {
        self.blocks.iter().filter_map(Block::gate)
    }

    /// `true` if any block is conditional.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        self.gates().next().is_some()
    }

    /// `true` if no block contains a directive.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.blocks.iter().all(|b| b.text().trim().is_empty())
    }

    /// The script text exactly as the driver should receive it.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.render_into(&mut out);
        }
        out
    }
}

impl fmt::Display for ScriptFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn normalize(text: &str) -> String {
    let dedented = dedent(text);
    match dedented.strip_prefix('\n') {
        Some(rest) => rest.to_owned(),
        None => dedented,
    }
}

// ---------------------------------------------------------------------------
// dedent
// ---------------------------------------------------------------------------

/// Remove the whitespace prefix shared by every non-blank line.
///
/// Lines holding only whitespace do not take part in the common prefix and
/// are emptied in the output. Line endings are preserved.
#[must_use]
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let indent = &line[..line.len() - line.trim_start().len()];
        margin = Some(margin.map_or(indent, |m| common_prefix(m, indent)));
    }
    let margin = margin.unwrap_or("");

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (body, newline) = line
            .strip_suffix('\n')
            .map_or((line, ""), |body| (body, "\n"));
        if !body.trim().is_empty() {
            out.push_str(body.strip_prefix(margin).unwrap_or(body));
        }
        out.push_str(newline);
    }
    out
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((i, c), _)| i + c.len_utf8());
    &a[..len]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
