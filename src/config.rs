//! Pipeline configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration. Command-line flags override values loaded from disk.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::TimerField;

/// Errors from loading or saving the configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ospf::config::read),
        help("Ensure the config file exists, or omit --config to use the defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(ospf::config::parse),
        help(
            "Check the TOML syntax. Valid reference_field values are hello_a, hello_b, \
             dead_a and dead_b."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ospf::config::write),
        help("Ensure you have write permission to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid topology range {min}..={max}")]
    #[diagnostic(
        code(ospf::config::range),
        help("evaluation.min_topology must not exceed evaluation.max_topology.")
    )]
    Range { min: u32, max: u32 },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Topology range scored by the evaluation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_min_topology")]
    pub min_topology: u32,
    #[serde(default = "default_max_topology")]
    pub max_topology: u32,
}

fn default_min_topology() -> u32 {
    1
}
fn default_max_topology() -> u32 {
    50
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            min_topology: default_min_topology(),
            max_topology: default_max_topology(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Router names whose captures make up one topology.
    #[serde(default = "default_routers")]
    pub routers: Vec<String>,
    /// Root of the raw capture layout.
    #[serde(default = "default_capture_dir")]
    pub capture_dir: PathBuf,
    /// Root of every generated artifact.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Hand-authored ground-truth text.
    #[serde(default = "default_ground_truth")]
    pub ground_truth: PathBuf,
    /// Rows lacking this timer are dropped during cleaning.
    #[serde(default)]
    pub reference_field: TimerField,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

fn default_routers() -> Vec<String> {
    (1..=12).map(|n| format!("R{n}")).collect()
}
fn default_capture_dir() -> PathBuf {
    PathBuf::from("rawdata")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_ground_truth() -> PathBuf {
    PathBuf::from("ground_truth.txt")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            routers: default_routers(),
            capture_dir: default_capture_dir(),
            output_dir: default_output_dir(),
            ground_truth: default_ground_truth(),
            reference_field: TimerField::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let EvaluationConfig {
            min_topology,
            max_topology,
        } = self.evaluation;
        if min_topology > max_topology {
            return Err(ConfigError::Range {
                min: min_topology,
                max: max_topology,
            });
        }
        Ok(())
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir)
    }
}

/// Where each stage reads and writes under `output_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// `<output>/topologies/topology_<n>.json`
    pub topologies_dir: PathBuf,
    /// `<output>/datasets/dataset_<n>.csv`, cleaned rows
    pub datasets_dir: PathBuf,
    /// `<output>/labeled/labeled_<n>.csv`
    pub labeled_dir: PathBuf,
    /// `<output>/ground_truth/GT.csv`
    pub ground_truth_csv: PathBuf,
    /// `<output>/evaluation/`
    pub evaluation_dir: PathBuf,
    /// `<output>/reports/report_<n>.txt`
    pub reports_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            topologies_dir: root.join("topologies"),
            datasets_dir: root.join("datasets"),
            labeled_dir: root.join("labeled"),
            ground_truth_csv: root.join("ground_truth").join("GT.csv"),
            evaluation_dir: root.join("evaluation"),
            reports_dir: root.join("reports"),
        }
    }

    pub fn topology_json(&self, id: u32) -> PathBuf {
        self.topologies_dir.join(format!("topology_{id}.json"))
    }

    pub fn dataset_csv(&self, id: u32) -> PathBuf {
        self.datasets_dir.join(format!("dataset_{id}.csv"))
    }

    pub fn labeled_csv(&self, id: u32) -> PathBuf {
        self.labeled_dir.join(format!("labeled_{id}.csv"))
    }

    pub fn report_txt(&self, id: u32) -> PathBuf {
        self.reports_dir.join(format!("report_{id}.txt"))
    }

    /// Evaluation report name for a topology range; `ext` is `txt` or `json`.
    pub fn evaluation_file(&self, min: u32, max: u32, ext: &str) -> PathBuf {
        self.evaluation_dir
            .join(format!("evaluation_{min}_{max}_topologies.{ext}"))
    }
}

/// Topology number embedded in a file name: `labeled_12.csv` → 12.
pub fn topology_number(file_name: &str) -> Option<u32> {
    let digits: String = file_name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_twelve_routers() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.routers.len(), 12);
        assert_eq!(cfg.routers[0], "R1");
        assert_eq!(cfg.routers[11], "R12");
        assert_eq!(cfg.reference_field, TimerField::HelloA);
        assert_eq!(cfg.evaluation, EvaluationConfig { min_topology: 1, max_topology: 50 });
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: PipelineConfig = toml::from_str(
            "reference_field = \"dead_b\"\n[evaluation]\nmax_topology = 100\n",
        )
        .unwrap();
        assert_eq!(cfg.reference_field, TimerField::DeadB);
        assert_eq!(cfg.evaluation.min_topology, 1);
        assert_eq!(cfg.evaluation.max_topology, 100);
        assert_eq!(cfg.capture_dir, PathBuf::from("rawdata"));
    }

    #[test]
    fn config_roundtrip_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ospf.toml");

        let cfg = PipelineConfig {
            routers: vec!["R1".into(), "R2".into()],
            reference_field: TimerField::HelloB,
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn bad_reference_field_is_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "reference_field = \"mtu_a\"\n").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("range.toml");
        std::fs::write(&path, "[evaluation]\nmin_topology = 9\nmax_topology = 3\n").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path).unwrap_err(),
            ConfigError::Range { min: 9, max: 3 }
        ));
    }

    #[test]
    fn layout_file_names() {
        let layout = OutputLayout::new(Path::new("out"));
        assert_eq!(layout.labeled_csv(7), PathBuf::from("out/labeled/labeled_7.csv"));
        assert_eq!(
            layout.evaluation_file(1, 50, "txt"),
            PathBuf::from("out/evaluation/evaluation_1_50_topologies.txt")
        );
        assert_eq!(topology_number("labeled_12.csv"), Some(12));
        assert_eq!(topology_number("GT.csv"), None);
    }
}
