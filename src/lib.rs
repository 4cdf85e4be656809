// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ospf-mismatch
//!
//! Builds a labeled dataset of OSPF adjacencies from raw router command
//! captures, detects configuration mismatches with a fixed rule set, and
//! scores those detections against hand-authored ground truth.
//!
//! ## Architecture
//!
//! - **Captures** (`capture`): six command outputs per router behind a `CaptureSource` seam
//! - **Parsers** (`parse`): best-effort line scanners, one per command
//! - **Merger** (`merge`): per-router fragments → one router document per topology
//! - **Dataset** (`dataset`): paired-attribute adjacency rows, cleaning, CSV tables
//! - **Rules** (`rules`): ten mismatch labels per adjacency
//! - **Ground truth** (`truth`): `Topologi <n> -> ...` assertions applied to rows
//! - **Evaluation** (`eval`): per-label, macro, micro and subset metrics
//! - **Reports** (`report`): human-readable findings with remedies
//!
//! ## Library usage
//!
//! ```no_run
//! use ospf_mismatch::capture::DirectoryCapture;
//! use ospf_mismatch::dataset::{TimerField, assemble, clean};
//! use ospf_mismatch::merge::build_topology;
//! use ospf_mismatch::rules::label_dataset;
//!
//! let source = DirectoryCapture::new("rawdata");
//! let routers: Vec<String> = (1..=12).map(|n| format!("R{n}")).collect();
//! let topology = build_topology(1, &source, &routers);
//! let rows = clean(assemble(&topology), TimerField::HelloA);
//! for labeled in label_dataset(&rows) {
//!     println!("{:?}", labeled.labels.raised().collect::<Vec<_>>());
//! }
//! ```

pub mod capture;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod labels;
pub mod merge;
pub mod model;
pub mod parse;
pub mod report;
pub mod rules;
pub mod stages;
pub mod truth;
