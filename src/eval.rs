//! Multi-label evaluation of rule predictions against ground truth.
//!
//! Both tables are filtered to a topology range and sorted by
//! `(topology, router_a, router_b)`, then compared row by row. Any difference
//! in row count or key columns is fatal: metrics over misaligned rows would
//! be meaningless.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::dataset::{LabeledRow, sort_labeled};
use crate::error::{EvalError, EvalResult};
use crate::labels::Label;

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

fn f1(precision: f64, recall: f64) -> f64 {
    ratio(2.0 * precision * recall, precision + recall)
}

/// Confusion counts over one label or over all labels pooled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
}

impl Confusion {
    pub fn record(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (true, true) => self.tp += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    pub fn add(&mut self, other: &Confusion) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.tn += other.tn;
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp as f64, (self.tp + self.fp) as f64)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp as f64, (self.tp + self.fn_) as f64)
    }

    pub fn f1(&self) -> f64 {
        f1(self.precision(), self.recall())
    }

    pub fn accuracy(&self) -> f64 {
        ratio((self.tp + self.tn) as f64, self.total() as f64)
    }

    /// Ground-truth positives.
    pub fn positives(&self) -> usize {
        self.tp + self.fn_
    }

    /// Ground-truth negatives.
    pub fn negatives(&self) -> usize {
        self.tn + self.fp
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub label: Label,
    pub counts: Confusion,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

impl LabelMetrics {
    fn from_counts(label: Label, counts: Confusion) -> Self {
        Self {
            label,
            counts,
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            accuracy: counts.accuracy(),
        }
    }
}

/// Unweighted means of the per-label metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacroAverages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

/// Metrics over counts pooled across every label and row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MicroMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `TP / (TP + FP + FN)`
    pub jaccard: f64,
    /// `(TP + TN) / all decisions`
    pub standard_accuracy: f64,
    /// `(TP + TN) / (rows * labels)`
    pub hamming_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Requested inclusive range.
    pub min_topology: u32,
    pub max_topology: u32,
    /// Distinct topologies actually present after filtering.
    pub topologies: usize,
    /// Smallest and largest topology present, if any.
    pub observed_range: Option<(u32, u32)>,
    pub samples: usize,
    pub per_label: Vec<LabelMetrics>,
    pub macro_avg: MacroAverages,
    pub micro: MicroMetrics,
    pub totals: Confusion,
    /// Fraction of rows whose whole label vector matches. 1.0 with no rows.
    pub subset_accuracy: f64,
}

fn in_range(rows: &[LabeledRow], min: u32, max: u32) -> Vec<LabeledRow> {
    let mut kept: Vec<LabeledRow> = rows
        .iter()
        .filter(|r| (min..=max).contains(&r.row.topology))
        .cloned()
        .collect();
    sort_labeled(&mut kept);
    kept
}

fn check_alignment(truth: &[LabeledRow], predicted: &[LabeledRow]) -> EvalResult<()> {
    for (idx, (t, p)) in truth.iter().zip(predicted).enumerate() {
        let columns: [(&'static str, String, String); 3] = [
            ("topology", t.row.topology.to_string(), p.row.topology.to_string()),
            ("router_a", t.row.a.router.clone(), p.row.a.router.clone()),
            ("router_b", t.row.b.router.clone(), p.row.b.router.clone()),
        ];
        for (column, truth, predicted) in columns {
            if truth != predicted {
                return Err(EvalError::Alignment {
                    row: idx,
                    column,
                    truth,
                    predicted,
                });
            }
        }
    }
    Ok(())
}

/// Compare predictions with ground truth over topologies `min..=max`.
pub fn evaluate(
    truth: &[LabeledRow],
    predicted: &[LabeledRow],
    min_topology: u32,
    max_topology: u32,
) -> EvalResult<Evaluation> {
    let truth = in_range(truth, min_topology, max_topology);
    let predicted = in_range(predicted, min_topology, max_topology);

    if truth.len() != predicted.len() {
        return Err(EvalError::Shape {
            min: min_topology,
            max: max_topology,
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    check_alignment(&truth, &predicted)?;

    let mut counts = [Confusion::default(); Label::COUNT];
    let mut exact = 0usize;
    for (t, p) in truth.iter().zip(&predicted) {
        if t.labels == p.labels {
            exact += 1;
        }
        for (slot, label) in counts.iter_mut().zip(Label::ALL) {
            slot.record(t.labels.get(label), p.labels.get(label));
        }
    }

    let per_label: Vec<LabelMetrics> = Label::ALL
        .into_iter()
        .zip(counts)
        .map(|(label, c)| LabelMetrics::from_counts(label, c))
        .collect();

    let n = Label::COUNT as f64;
    let macro_avg = MacroAverages {
        precision: per_label.iter().map(|m| m.precision).sum::<f64>() / n,
        recall: per_label.iter().map(|m| m.recall).sum::<f64>() / n,
        f1: per_label.iter().map(|m| m.f1).sum::<f64>() / n,
        accuracy: per_label.iter().map(|m| m.accuracy).sum::<f64>() / n,
    };

    let mut totals = Confusion::default();
    for c in &counts {
        totals.add(c);
    }
    let samples = truth.len();
    let micro = MicroMetrics {
        precision: totals.precision(),
        recall: totals.recall(),
        f1: totals.f1(),
        jaccard: ratio(totals.tp as f64, (totals.tp + totals.fp + totals.fn_) as f64),
        standard_accuracy: totals.accuracy(),
        hamming_accuracy: ratio((totals.tp + totals.tn) as f64, (samples * Label::COUNT) as f64),
    };

    let topology_ids: BTreeSet<u32> = truth.iter().map(|r| r.row.topology).collect();
    let observed_range = topology_ids
        .first()
        .copied()
        .zip(topology_ids.last().copied());

    let evaluation = Evaluation {
        min_topology,
        max_topology,
        topologies: topology_ids.len(),
        observed_range,
        samples,
        per_label,
        macro_avg,
        micro,
        totals,
        subset_accuracy: if samples == 0 {
            1.0
        } else {
            exact as f64 / samples as f64
        },
    };

    tracing::info!(
        samples,
        topologies = evaluation.topologies,
        micro_f1 = evaluation.micro.f1,
        subset_accuracy = evaluation.subset_accuracy,
        "evaluation complete"
    );
    Ok(evaluation)
}

impl Evaluation {
    pub fn label(&self, label: Label) -> &LabelMetrics {
        &self.per_label[label as usize]
    }

    /// Plain-text report: header, per-label table, macro, micro, totals.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        let range = self
            .observed_range
            .map_or_else(|| "none".to_string(), |(lo, hi)| format!("{lo}-{hi}"));

        let _ = writeln!(
            out,
            "=== RULE-BASED EVALUATION (topologies {}-{}) ===",
            self.min_topology, self.max_topology
        );
        let _ = writeln!(out, "Topologies        : {} (range: {range})", self.topologies);
        let _ = writeln!(out, "Samples (rows)    : {}", self.samples);
        let _ = writeln!(out, "Labels            : {} (per sample)", Label::COUNT);

        let _ = writeln!(out, "\n== Per Label ==");
        let _ = writeln!(
            out,
            "Label                  | TP   FP   FN   TN   | Prec   Rec    F1     Acc    | Pos  Neg  All"
        );
        let _ = writeln!(out, "{}", "-".repeat(96));
        for m in &self.per_label {
            let c = &m.counts;
            let _ = writeln!(
                out,
                "{:22} | {:4} {:4} {:4} {:4} | {:.4} {:.4} {:.4} {:.4} | {:4} {:4} {:4}",
                m.label.name(),
                c.tp,
                c.fp,
                c.fn_,
                c.tn,
                m.precision,
                m.recall,
                m.f1,
                m.accuracy,
                c.positives(),
                c.negatives(),
                c.total()
            );
        }

        let _ = writeln!(out, "\n== Macro Averages ==");
        let _ = writeln!(out, "Macro Precision       : {:.4}", self.macro_avg.precision);
        let _ = writeln!(out, "Macro Recall          : {:.4}", self.macro_avg.recall);
        let _ = writeln!(out, "Macro F1-Score        : {:.4}", self.macro_avg.f1);
        let _ = writeln!(out, "Macro Accuracy        : {:.4}", self.macro_avg.accuracy);

        let _ = writeln!(out, "\n== Micro Metrics (Global) ==");
        let _ = writeln!(out, "Micro Precision       : {:.4}", self.micro.precision);
        let _ = writeln!(out, "Micro Recall          : {:.4}", self.micro.recall);
        let _ = writeln!(out, "Micro F1-Score        : {:.4}", self.micro.f1);
        let _ = writeln!(out, "Micro Accuracy Jaccard: {:.4}", self.micro.jaccard);
        let _ = writeln!(out, "Micro Accuracy Std    : {:.4}", self.micro.standard_accuracy);
        let _ = writeln!(out, "Hamming Accuracy      : {:.4}", self.micro.hamming_accuracy);

        let _ = writeln!(out, "\n== TP/FP/FN/TN & Subset Accuracy ==");
        let _ = writeln!(
            out,
            "Total TP/FP/FN/TN     : {}/{}/{}/{}",
            self.totals.tp, self.totals.fp, self.totals.fn_, self.totals.tn
        );
        let _ = writeln!(
            out,
            "Subset Accuracy (exact match, mean per sample) : {:.4}",
            self.subset_accuracy
        );
        let _ = writeln!(out, "Total Samples Evaluated                        : {}", self.samples);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::row;
    use crate::labels::LabelVector;
    use crate::truth::GroundTruth;

    fn labeled(topology: u32, a: &str, b: &str, labels: &[Label]) -> LabeledRow {
        LabeledRow {
            row: row(topology, a, b),
            labels: labels.iter().copied().collect(),
        }
    }

    #[test]
    fn dead_mismatch_true_positive() {
        let truth = GroundTruth::parse("Topologi 5 -> DeadMismatch R1 & R9\n")
            .apply(&[row(5, "R1", "R9"), row(5, "R1", "R2")]);
        let predicted = vec![
            labeled(5, "R1", "R2", &[]),
            labeled(5, "R1", "R9", &[Label::DeadMismatch]),
        ];

        let eval = evaluate(&truth, &predicted, 1, 50).unwrap();
        let dead = eval.label(Label::DeadMismatch);
        assert_eq!(dead.counts, Confusion { tp: 1, fp: 0, fn_: 0, tn: 1 });
        assert_eq!(dead.f1, 1.0);
        assert_eq!(eval.totals.tp, 1);
        assert_eq!(eval.totals.tn, 19);
        assert_eq!(eval.subset_accuracy, 1.0);
        assert_eq!(eval.micro.hamming_accuracy, 1.0);
        assert_eq!(eval.observed_range, Some((5, 5)));
    }

    #[test]
    fn zero_division_yields_zero() {
        let rows = vec![labeled(1, "R1", "R2", &[])];
        let eval = evaluate(&rows, &rows, 1, 1).unwrap();
        let hello = eval.label(Label::HelloMismatch);
        assert_eq!(hello.precision, 0.0);
        assert_eq!(hello.recall, 0.0);
        assert_eq!(hello.f1, 0.0);
        assert_eq!(hello.accuracy, 1.0);
        assert_eq!(eval.micro.jaccard, 0.0);
    }

    #[test]
    fn mixed_predictions() {
        let truth = vec![
            labeled(1, "R1", "R2", &[Label::HelloMismatch]),
            labeled(1, "R2", "R3", &[Label::HelloMismatch, Label::MtuMismatch]),
        ];
        let predicted = vec![
            labeled(1, "R1", "R2", &[Label::HelloMismatch, Label::AreaMismatch]),
            labeled(1, "R2", "R3", &[Label::MtuMismatch]),
        ];
        let eval = evaluate(&truth, &predicted, 1, 1).unwrap();

        assert_eq!(eval.totals, Confusion { tp: 2, fp: 1, fn_: 1, tn: 16 });
        assert!((eval.micro.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.micro.jaccard - 0.5).abs() < 1e-12);
        assert!((eval.micro.hamming_accuracy - 0.9).abs() < 1e-12);
        assert_eq!(eval.subset_accuracy, 0.0);
        let hello = eval.label(Label::HelloMismatch);
        assert_eq!(hello.precision, 1.0);
        assert_eq!(hello.recall, 0.5);
    }

    #[test]
    fn order_independent() {
        let truth = vec![
            labeled(1, "R1", "R2", &[Label::HelloMismatch]),
            labeled(2, "R1", "R3", &[]),
            labeled(1, "R3", "R4", &[Label::PassiveMismatch]),
        ];
        let predicted = vec![
            labeled(1, "R1", "R2", &[]),
            labeled(2, "R1", "R3", &[Label::AuthMismatch]),
            labeled(1, "R3", "R4", &[Label::PassiveMismatch]),
        ];
        let forward = evaluate(&truth, &predicted, 1, 2).unwrap();

        let mut t = truth.clone();
        let mut p = predicted.clone();
        t.reverse();
        p.reverse();
        t.swap(0, 1);
        p.swap(0, 1);
        assert_eq!(evaluate(&t, &p, 1, 2).unwrap(), forward);
    }

    #[test]
    fn range_filter_applies_to_both_sides() {
        let truth = vec![labeled(1, "R1", "R2", &[]), labeled(60, "R1", "R2", &[])];
        let predicted = vec![labeled(1, "R1", "R2", &[])];
        let eval = evaluate(&truth, &predicted, 1, 50).unwrap();
        assert_eq!(eval.samples, 1);
    }

    #[test]
    fn shape_and_alignment_violations() {
        let truth = vec![labeled(1, "R1", "R2", &[]), labeled(1, "R2", "R3", &[])];
        let short = vec![labeled(1, "R1", "R2", &[])];
        assert!(matches!(
            evaluate(&truth, &short, 1, 50),
            Err(EvalError::Shape { truth: 2, predicted: 1, .. })
        ));

        let shifted = vec![labeled(1, "R1", "R2", &[]), labeled(1, "R2", "R4", &[])];
        match evaluate(&truth, &shifted, 1, 50) {
            Err(EvalError::Alignment { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "router_b");
            }
            other => panic!("expected alignment error, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection() {
        let eval = evaluate(&[], &[], 1, 50).unwrap();
        assert_eq!(eval.samples, 0);
        assert_eq!(eval.subset_accuracy, 1.0);
        assert_eq!(eval.observed_range, None);
    }

    #[test]
    fn report_layout() {
        let rows = vec![LabeledRow {
            row: row(3, "R1", "R2"),
            labels: LabelVector::default(),
        }];
        let report = evaluate(&rows, &rows, 1, 50).unwrap().render_report();
        assert!(report.contains("Topologies        : 1 (range: 3-3)"));
        assert!(report.contains("HelloMismatch          |    0    0    0    1 |"));
        assert!(report.contains("Macro F1-Score        : 0.0000"));
        assert!(report.contains("Total TP/FP/FN/TN     : 0/0/0/10"));
        assert!(report.contains("Total Samples Evaluated                        : 1"));
    }
}
