//! Pipeline stages over the on-disk output layout.
//!
//! Each stage reads what an earlier stage wrote under
//! [`OutputLayout`](crate::config::OutputLayout) and writes its own
//! artifacts. A topology whose input file is missing or unreadable is skipped
//! with a warning; schema and alignment violations abort the stage.

use std::path::{Path, PathBuf};

use crate::capture::CaptureSource;
use crate::config::{OutputLayout, PipelineConfig, topology_number};
use crate::dataset::table::{self, read_file, write_file};
use crate::dataset::{AdjacencyRow, LabeledRow, assemble, clean};
use crate::error::{MismatchError, MismatchResult};
use crate::eval::{Evaluation, evaluate};
use crate::merge::build_topology;
use crate::model::Topology;
use crate::truth::GroundTruth;
use crate::{report, rules};

/// Numbered files in `dir` with the given extension, sorted by number.
/// A missing directory yields an empty list.
pub fn numbered_files(dir: &Path, ext: &str) -> MismatchResult<Vec<(u32, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| MismatchError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files: Vec<(u32, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .filter_map(|p| {
            let number = topology_number(p.file_name()?.to_str()?)?;
            Some((number, p))
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn load_topology(path: &Path, id: u32) -> MismatchResult<Topology> {
    let text = read_file(path)?;
    Topology::from_json(id, &text).map_err(|e| MismatchError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge one topology from captures and write its JSON document.
pub fn build(
    config: &PipelineConfig,
    source: &dyn CaptureSource,
    id: u32,
) -> MismatchResult<PathBuf> {
    let topology = build_topology(id, source, &config.routers);
    let json = topology.to_json().map_err(|e| MismatchError::Json {
        path: format!("topology {id}"),
        message: e.to_string(),
    })?;
    let path = config.layout().topology_json(id);
    write_file(&path, &json)?;
    tracing::info!(topology = id, path = %path.display(), "wrote topology document");
    Ok(path)
}

/// Turn every topology document into a cleaned adjacency dataset.
pub fn dataset(config: &PipelineConfig) -> MismatchResult<usize> {
    let layout = config.layout();
    let mut written = 0usize;
    for (id, path) in numbered_files(&layout.topologies_dir, "json")? {
        let topology = match load_topology(&path, id) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(topology = id, error = %e, "skipping topology document");
                continue;
            }
        };
        let rows = clean(assemble(&topology), config.reference_field);
        table::save_rows(&layout.dataset_csv(id), &rows)?;
        tracing::info!(topology = id, rows = rows.len(), "wrote cleaned dataset");
        written += 1;
    }
    Ok(written)
}

fn load_datasets(layout: &OutputLayout) -> MismatchResult<Vec<(u32, Vec<AdjacencyRow>)>> {
    let mut out = Vec::new();
    for (id, path) in numbered_files(&layout.datasets_dir, "csv")? {
        match table::load_rows(&path) {
            Ok(rows) => out.push((id, rows)),
            Err(MismatchError::Io { path, source }) => {
                tracing::warn!(topology = id, path = %path, error = %source, "skipping unreadable dataset");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Label every cleaned dataset with the rule engine.
pub fn label(config: &PipelineConfig) -> MismatchResult<usize> {
    let layout = config.layout();
    let datasets = load_datasets(&layout)?;
    for (id, rows) in &datasets {
        let labeled = rules::label_dataset(rows);
        table::save_labeled(&layout.labeled_csv(*id), &labeled)?;
    }
    tracing::info!(datasets = datasets.len(), "labeled datasets");
    Ok(datasets.len())
}

/// Apply the ground-truth file to every cleaned dataset; one combined table.
pub fn truth(config: &PipelineConfig) -> MismatchResult<PathBuf> {
    let layout = config.layout();
    let truth = GroundTruth::load(&config.ground_truth)?;
    let rows: Vec<_> = load_datasets(&layout)?
        .into_iter()
        .flat_map(|(_, rows)| rows)
        .collect();
    let labeled = truth.apply(&rows);
    table::save_labeled(&layout.ground_truth_csv, &labeled)?;
    tracing::info!(rows = labeled.len(), path = %layout.ground_truth_csv.display(), "wrote ground-truth table");
    Ok(layout.ground_truth_csv.clone())
}

fn load_predictions(layout: &OutputLayout) -> MismatchResult<Vec<LabeledRow>> {
    let mut rows = Vec::new();
    for (_, path) in numbered_files(&layout.labeled_dir, "csv")? {
        rows.extend(table::load_labeled(&path)?);
    }
    Ok(rows)
}

/// Score rule predictions against the ground-truth table and write the
/// text and JSON reports.
pub fn evaluation(config: &PipelineConfig) -> MismatchResult<Evaluation> {
    let layout = config.layout();
    let truth = table::load_labeled(&layout.ground_truth_csv)?;
    let predicted = load_predictions(&layout)?;
    let (min, max) = (config.evaluation.min_topology, config.evaluation.max_topology);

    let result = evaluate(&truth, &predicted, min, max)?;

    write_file(&layout.evaluation_file(min, max, "txt"), &result.render_report())?;
    let json_path = layout.evaluation_file(min, max, "json");
    let json = serde_json::to_string_pretty(&result).map_err(|e| MismatchError::Json {
        path: json_path.display().to_string(),
        message: e.to_string(),
    })?;
    write_file(&json_path, &json)?;
    Ok(result)
}

/// Write one mismatch report per labeled topology.
pub fn reports(config: &PipelineConfig) -> MismatchResult<usize> {
    let layout = config.layout();
    let rendered = report::render_by_topology(&load_predictions(&layout)?);
    for (id, text) in &rendered {
        write_file(&layout.report_txt(*id), text)?;
    }
    tracing::info!(reports = rendered.len(), "wrote mismatch reports");
    Ok(rendered.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_files_sorted_numerically() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["labeled_10.csv", "labeled_2.csv", "notes.txt", "GT.csv"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let files = numbered_files(dir.path(), "csv").unwrap();
        let ids: Vec<u32> = files.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 10]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(numbered_files(&dir.path().join("absent"), "csv").unwrap().is_empty());
    }

    #[test]
    fn broken_topology_document_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("topology_1.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_topology(&path, 1), Err(MismatchError::Json { .. })));
    }
}
