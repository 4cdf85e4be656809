//! Normalized per-router / per-interface data model.
//!
//! A [`Topology`] is what the merger produces from one capture snapshot. Its
//! JSON form (router name → `{router_id, interfaces, routing}`) is the
//! per-topology document written between the parse and dataset stages.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OSPF authentication mode reported for an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    #[default]
    None,
    Simple,
    MessageDigest,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Simple => "simple",
            Self::MessageDigest => "message-digest",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "simple" => Ok(Self::Simple),
            "message-digest" | "md5" => Ok(Self::MessageDigest),
            other => Err(format!("unknown OSPF auth type \"{other}\"")),
        }
    }
}

/// OSPF attributes of one interface, merged from config and state output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hello: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default)]
    pub auth_type: AuthType,
    /// Key id → secret. Simple authentication is stored under the id `simple`.
    #[serde(default)]
    pub auth_keys: BTreeMap<String, String>,
    /// `None` when the interface was never classified (no OSPF data at merge time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<bool>,
}

/// The router and interface discovered on the far side of a local interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub router: String,
    pub interface: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ospf: Option<OspfRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbor: Option<Neighbor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    /// Active routing protocols, lower-case, first occurrence order.
    #[serde(rename = "protocol", default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub redistribute: bool,
}

/// One merged router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterDocument {
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub interfaces: BTreeMap<String, InterfaceRecord>,
    #[serde(default)]
    pub routing: Routing,
}

/// All merged routers of one snapshot, keyed by router name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub id: u32,
    pub routers: BTreeMap<String, RouterDocument>,
}

impl Topology {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            routers: BTreeMap::new(),
        }
    }

    /// Serialize the router map as the per-topology JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.routers)
    }

    /// Rebuild a topology from its JSON document. The id is not part of the
    /// document and must be supplied by the caller.
    pub fn from_json(id: u32, json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            id,
            routers: serde_json::from_str(json)?,
        })
    }
}

/// Canonical text form of a router's protocol list.
///
/// Lower-cases and dedupes (first occurrence wins). `ospf` and `eigrp`
/// together always read `ospf,eigrp`; any other combination is joined
/// alphabetically.
pub fn canonical_protocols(protocols: &[String]) -> String {
    let mut unique: Vec<String> = Vec::new();
    for token in protocols {
        let token = token.trim().to_lowercase();
        if !token.is_empty() && !unique.contains(&token) {
            unique.push(token);
        }
    }

    match unique.as_slice() {
        [one] if one == "ospf" || one == "eigrp" => one.clone(),
        [a, b] if (a == "ospf" && b == "eigrp") || (a == "eigrp" && b == "ospf") => {
            "ospf,eigrp".to_string()
        }
        _ => {
            unique.sort();
            unique.join(",")
        }
    }
}
