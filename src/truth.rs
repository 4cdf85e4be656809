//! Hand-authored ground truth.
//!
//! One line per topology:
//!
//! ```text
//! Topologi 3  -> DeadMismatch R1 & R9
//! Topologi 7  -> AuthKeyMismatch & AuthMismatch R2 & R3
//! Topologi 10 -> RedistributeMismatch R2
//! Topologi 12 -> (HelloMismatch R1 & R2) & (DeadMismatch R1 & R9)
//! Topologi 14 -> Normal
//! ```
//!
//! Lines are parsed into [`Assertion`]s, collected into a [`GroundTruth`], and
//! then applied to cleaned adjacency rows to produce the expected labels.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::dataset::table::read_file;
use crate::dataset::{AdjacencyRow, LabeledRow, sort_labeled};
use crate::error::MismatchResult;
use crate::labels::{Label, LabelVector};

static RE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Topolog[iy]\s+(\d+)\s*->\s*(.+)$").unwrap());

static RE_SEGMENT_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\)\s*&\s*\(").unwrap());

static RE_PAIR_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)\s*&\s*(\S+)\s*$").unwrap());

static RE_SINGLE_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\S+)\s*$").unwrap());

/// One asserted fault set, either on a link or on a single router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    Pair {
        labels: Vec<Label>,
        routers: (String, String),
    },
    Single {
        labels: Vec<Label>,
        router: String,
    },
}

fn parse_labels(text: &str) -> Vec<Label> {
    text.split('&')
        .map(str::trim)
        .filter_map(|token| match token.parse::<Label>() {
            Ok(label) => Some(label),
            Err(_) => {
                if !token.is_empty() {
                    tracing::debug!(token, "ignoring unknown label token");
                }
                None
            }
        })
        .collect()
}

/// Parse one segment such as `AuthKeyMismatch & AuthMismatch R2 & R3`.
///
/// Returns `None` for empty or `...` segments and for segments naming no
/// known label.
pub fn parse_segment(segment: &str) -> Option<Assertion> {
    let segment = segment.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
    if segment.is_empty() || segment == "..." {
        return None;
    }

    let assertion = if let Some(caps) = RE_PAIR_TAIL.captures(segment) {
        let whole = caps.get(0)?;
        // `HelloMismatch & DeadMismatch` alone names no router pair.
        if caps[1].parse::<Label>().is_ok() || caps[2].parse::<Label>().is_ok() {
            return None;
        }
        Assertion::Pair {
            labels: parse_labels(&segment[..whole.start()]),
            routers: (caps[1].to_string(), caps[2].to_string()),
        }
    } else {
        let caps = RE_SINGLE_TAIL.captures(segment)?;
        let whole = caps.get(0)?;
        Assertion::Single {
            labels: parse_labels(&segment[..whole.start()]),
            router: caps[1].to_string(),
        }
    };

    match &assertion {
        Assertion::Pair { labels, .. } | Assertion::Single { labels, .. } if labels.is_empty() => {
            tracing::debug!(segment, "segment names no known label");
            None
        }
        _ => Some(assertion),
    }
}

/// Parse one ground-truth line into its topology and assertions.
///
/// Lines not matching the line grammar yield `None`. A `Normal` topology
/// yields an empty assertion list.
pub fn parse_line(line: &str) -> Option<(u32, Vec<Assertion>)> {
    let caps = RE_LINE.captures(line.trim())?;
    let topology = caps[1].parse().ok()?;
    let description = caps[2].trim();

    if description.contains("Normal") {
        return Some((topology, Vec::new()));
    }

    let assertions = RE_SEGMENT_SPLIT
        .split(description)
        .filter_map(parse_segment)
        .collect();
    Some((topology, assertions))
}

fn pair_key(topology: u32, x: &str, y: &str) -> (u32, String, String) {
    if x <= y {
        (topology, x.to_string(), y.to_string())
    } else {
        (topology, y.to_string(), x.to_string())
    }
}

/// Expected labels keyed by unordered router pair and by single router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    pairs: BTreeMap<(u32, String, String), LabelVector>,
    singles: BTreeMap<(u32, String), LabelVector>,
}

impl GroundTruth {
    pub fn parse(text: &str) -> Self {
        let mut truth = Self::default();
        let mut lines = 0usize;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match parse_line(line) {
                Some((topology, assertions)) => {
                    lines += 1;
                    for assertion in assertions {
                        truth.record(topology, assertion);
                    }
                }
                None => tracing::debug!(line, "skipping unrecognized ground-truth line"),
            }
        }
        tracing::info!(
            lines,
            pairs = truth.pairs.len(),
            singles = truth.singles.len(),
            "parsed ground truth"
        );
        truth
    }

    pub fn load(path: &Path) -> MismatchResult<Self> {
        Ok(Self::parse(&read_file(path)?))
    }

    /// Add one assertion. A router-id pair also marks both routers singly,
    /// so every link touching either of them carries the label.
    pub fn record(&mut self, topology: u32, assertion: Assertion) {
        match assertion {
            Assertion::Pair { labels, routers: (x, y) } => {
                let entry = self.pairs.entry(pair_key(topology, &x, &y)).or_default();
                for label in &labels {
                    entry.raise(*label);
                }
                if labels.contains(&Label::RouterIdMismatch) {
                    for router in [x, y] {
                        self.singles
                            .entry((topology, router))
                            .or_default()
                            .raise(Label::RouterIdMismatch);
                    }
                }
            }
            Assertion::Single { labels, router } => {
                let entry = self.singles.entry((topology, router)).or_default();
                for label in labels {
                    entry.raise(label);
                }
            }
        }
    }

    /// Union of the pair labels for `{a, b}` and the single labels of each.
    pub fn labels_for(&self, topology: u32, a: &str, b: &str) -> LabelVector {
        let mut labels = self
            .pairs
            .get(&pair_key(topology, a, b))
            .copied()
            .unwrap_or_default();
        for router in [a, b] {
            if let Some(single) = self.singles.get(&(topology, router.to_string())) {
                for label in single.raised() {
                    labels.raise(label);
                }
            }
        }
        labels
    }

    /// Attach expected labels to cleaned rows; output sorted by row key.
    pub fn apply(&self, rows: &[AdjacencyRow]) -> Vec<LabeledRow> {
        let mut labeled: Vec<LabeledRow> = rows
            .iter()
            .map(|row| LabeledRow {
                labels: self.labels_for(row.topology, &row.a.router, &row.b.router),
                row: row.clone(),
            })
            .collect();
        sort_labeled(&mut labeled);
        labeled
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.singles.is_empty()
    }
}
