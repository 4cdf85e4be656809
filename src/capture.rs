//! Raw command captures: where per-router command text comes from.
//!
//! Collecting the text from live devices is somebody else's job; this module
//! only defines the six commands the parsers understand and a
//! [`CaptureSource`] seam that hands their output over, keyed by router name.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CaptureError, CaptureResult};

/// The fixed set of commands captured from every router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `show run | section interface`
    InterfaceConfig,
    /// `show interfaces`
    InterfaceStats,
    /// `show ip ospf interface`
    OspfInterface,
    /// `show run | section router ospf`
    OspfProcess,
    /// `show cdp neighbor`
    Neighbors,
    /// `show ip protocols`
    Protocols,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::InterfaceConfig,
        CommandKind::InterfaceStats,
        CommandKind::OspfInterface,
        CommandKind::OspfProcess,
        CommandKind::Neighbors,
        CommandKind::Protocols,
    ];

    /// The exact command line sent to the device.
    pub fn command(self) -> &'static str {
        match self {
            Self::InterfaceConfig => "show run | section interface",
            Self::InterfaceStats => "show interfaces",
            Self::OspfInterface => "show ip ospf interface",
            Self::OspfProcess => "show run | section router ospf",
            Self::Neighbors => "show cdp neighbor",
            Self::Protocols => "show ip protocols",
        }
    }

    /// Capture sub-directory for this command.
    pub fn folder(self) -> &'static str {
        match self {
            Self::InterfaceConfig => "config",
            Self::InterfaceStats => "interfaces",
            Self::OspfInterface => "ospf",
            Self::OspfProcess => "ospf_config",
            Self::Neighbors => "cdp",
            Self::Protocols => "ip protocols",
        }
    }

    /// File name of a router's capture: spaces become `_`, `|` and `/` are dropped.
    pub fn file_name(self, router: &str) -> String {
        let cmd: String = self
            .command()
            .chars()
            .filter(|c| *c != '|' && *c != '/')
            .map(|c| if c == ' ' { '_' } else { c })
            .collect();
        format!("{router}_{cmd}.txt")
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Supplies the raw text of one command for one router.
pub trait CaptureSource {
    fn fetch(&self, router: &str, command: CommandKind) -> CaptureResult<String>;
}

/// Captures laid out on disk as `<root>/<folder>/<router>_<command>.txt`.
#[derive(Debug, Clone)]
pub struct DirectoryCapture {
    root: PathBuf,
}

impl DirectoryCapture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, router: &str, command: CommandKind) -> PathBuf {
        self.root
            .join(command.folder())
            .join(command.file_name(router))
    }
}

impl CaptureSource for DirectoryCapture {
    fn fetch(&self, router: &str, command: CommandKind) -> CaptureResult<String> {
        let path = self.path_for(router, command);
        if !path.exists() {
            return Err(CaptureError::Missing {
                router: router.to_string(),
                command: command.command().to_string(),
                path: path.display().to_string(),
            });
        }
        std::fs::read_to_string(&path).map_err(|source| CaptureError::Read {
            path: path.display().to_string(),
            source,
        })
    }
}

/// In-memory captures, mainly for tests and callers that already hold the text.
#[derive(Debug, Clone, Default)]
pub struct MemoryCapture {
    texts: HashMap<(String, CommandKind), String>,
}

impl MemoryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, router: &str, command: CommandKind, text: impl Into<String>) {
        self.texts.insert((router.to_string(), command), text.into());
    }

    pub fn with(mut self, router: &str, command: CommandKind, text: impl Into<String>) -> Self {
        self.insert(router, command, text);
        self
    }
}

impl CaptureSource for MemoryCapture {
    fn fetch(&self, router: &str, command: CommandKind) -> CaptureResult<String> {
        self.texts
            .get(&(router.to_string(), command))
            .cloned()
            .ok_or_else(|| CaptureError::Missing {
                router: router.to_string(),
                command: command.command().to_string(),
                path: "<memory>".to_string(),
            })
    }
}
