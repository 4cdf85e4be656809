//! Adjacency dataset: one paired-attribute row per link.
//!
//! The assembler emits one directed row per resolvable neighbor reference,
//! so a fully captured link appears twice (A→B and B→A). [`clean`] removes
//! the reverse direction and rows from one-sided captures; everything
//! downstream (labeling, ground truth, evaluation) assumes cleaned rows.

pub mod table;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::labels::LabelVector;
use crate::model::{AuthType, InterfaceRecord, RouterDocument, Topology, canonical_protocols};

/// One end of a link: router-level and interface-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub router: String,
    /// Canonical protocol list, see [`canonical_protocols`].
    pub routing: String,
    pub router_id: Option<String>,
    pub redistribute: bool,
    pub interface: String,
    pub ip: Option<String>,
    pub subnet: Option<String>,
    pub auth_keys: BTreeMap<String, String>,
    pub auth_type: AuthType,
    pub area: Option<u32>,
    pub network_type: Option<String>,
    pub hello: Option<u32>,
    pub dead: Option<u32>,
    pub passive: Option<bool>,
    pub mtu: Option<u32>,
    /// Router named by this interface's own neighbor entry.
    pub neighbor: Option<String>,
}

impl Endpoint {
    fn from_records(router: &str, doc: &RouterDocument, interface: &str, record: &InterfaceRecord) -> Self {
        let ospf = record.ospf.clone().unwrap_or_default();
        Self {
            router: router.to_string(),
            routing: canonical_protocols(&doc.routing.protocols),
            router_id: doc.router_id.clone(),
            redistribute: doc.routing.redistribute,
            interface: interface.to_string(),
            ip: record.ip.clone(),
            subnet: record.subnet.clone(),
            auth_keys: ospf.auth_keys,
            auth_type: ospf.auth_type,
            area: ospf.area,
            network_type: ospf.network_type,
            hello: ospf.hello,
            dead: ospf.dead,
            passive: ospf.passive,
            mtu: record.mtu,
            neighbor: record.neighbor.as_ref().map(|n| n.router.clone()),
        }
    }

    /// Whether the interface is flagged passive (an unclassified interface is not).
    pub fn is_passive(&self) -> bool {
        self.passive == Some(true)
    }
}

/// A link materialized as a directed pair, side A being the discovering router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyRow {
    pub topology: u32,
    pub a: Endpoint,
    pub b: Endpoint,
}

impl AdjacencyRow {
    /// Alignment key shared by predictions and ground truth.
    pub fn key(&self) -> (u32, &str, &str) {
        (self.topology, &self.a.router, &self.b.router)
    }

    /// Same link seen from the other end.
    pub fn reversed(&self) -> Self {
        Self {
            topology: self.topology,
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }
}

/// An adjacency row with its ten labels attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledRow {
    pub row: AdjacencyRow,
    pub labels: LabelVector,
}

/// Timer column whose absence marks a row as an unresolved capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerField {
    #[default]
    HelloA,
    HelloB,
    DeadA,
    DeadB,
}

impl TimerField {
    pub const ALL: [TimerField; 4] = [Self::HelloA, Self::HelloB, Self::DeadA, Self::DeadB];

    /// Look up a field by its column name, e.g. `dead_a`.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn value(self, row: &AdjacencyRow) -> Option<u32> {
        match self {
            Self::HelloA => row.a.hello,
            Self::HelloB => row.b.hello,
            Self::DeadA => row.a.dead,
            Self::DeadB => row.b.dead,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::HelloA => "hello_a",
            Self::HelloB => "hello_b",
            Self::DeadA => "dead_a",
            Self::DeadB => "dead_b",
        }
    }
}

/// Order router names the way they are numbered: `R2` before `R10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(s: &str) -> (&str, Option<u64>) {
        let idx = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, digits) = s.split_at(idx);
        (prefix, digits.parse().ok())
    }
    let (pa, na) = split(a);
    let (pb, nb) = split(b);
    pa.cmp(pb).then(na.cmp(&nb)).then_with(|| a.cmp(b))
}

/// Build one directed row per neighbor reference that resolves to a known
/// router and a known remote interface. Unresolvable references are dropped.
pub fn assemble(topology: &Topology) -> Vec<AdjacencyRow> {
    let mut names: Vec<&String> = topology.routers.keys().collect();
    names.sort_by(|a, b| natural_cmp(a, b));

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for name in names {
        let doc = &topology.routers[name];
        for (if_name, record) in &doc.interfaces {
            let Some(neighbor) = &record.neighbor else {
                continue;
            };
            let Some(remote_doc) = topology.routers.get(&neighbor.router) else {
                dropped += 1;
                continue;
            };
            let Some(remote_record) = remote_doc.interfaces.get(&neighbor.interface) else {
                dropped += 1;
                continue;
            };

            rows.push(AdjacencyRow {
                topology: topology.id,
                a: Endpoint::from_records(name, doc, if_name, record),
                b: Endpoint::from_records(&neighbor.router, remote_doc, &neighbor.interface, remote_record),
            });
        }
    }

    tracing::debug!(topology = topology.id, rows = rows.len(), dropped, "assembled adjacencies");
    rows
}

/// Drop rows without the reference timer, then keep one row per unordered
/// (router_a, neighbor_a) pair, first occurrence wins.
pub fn clean(rows: Vec<AdjacencyRow>, reference: TimerField) -> Vec<AdjacencyRow> {
    let before = rows.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let cleaned: Vec<AdjacencyRow> = rows
        .into_iter()
        .filter(|row| reference.value(row).is_some())
        .filter(|row| {
            let a = row.a.router.clone();
            let b = row.a.neighbor.clone().unwrap_or_default();
            let key = if a <= b { (a, b) } else { (b, a) };
            seen.insert(key)
        })
        .collect();

    tracing::debug!(
        before,
        after = cleaned.len(),
        reference = reference.column(),
        "cleaned adjacency rows"
    );
    cleaned
}

/// Sort by (topology, router_a, router_b). Stable, so ties keep input order.
pub fn sort_labeled(rows: &mut [LabeledRow]) {
    rows.sort_by(|x, y| x.row.key().cmp(&y.row.key()));
}


#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;
    use crate::model::{Neighbor, OspfRecord, Routing};

    fn interface(ip: &str, hello: Option<u32>, neighbor: Option<(&str, &str)>) -> InterfaceRecord {
        InterfaceRecord {
            ip: Some(ip.into()),
            subnet: Some("255.255.255.252".into()),
            mtu: Some(1500),
            ospf: Some(OspfRecord {
                area: Some(0),
                hello,
                dead: Some(40),
                network_type: Some("Broadcast".into()),
                passive: Some(false),
                ..Default::default()
            }),
            neighbor: neighbor.map(|(r, i)| Neighbor {
                router: r.into(),
                interface: i.into(),
            }),
        }
    }

    fn router(interfaces: Vec<(&str, InterfaceRecord)>, protocols: &[&str]) -> RouterDocument {
        RouterDocument {
            router_id: None,
            interfaces: interfaces.into_iter().map(|(n, r)| (n.to_string(), r)).collect(),
            routing: Routing {
                protocols: protocols.iter().map(|p| p.to_string()).collect(),
                redistribute: false,
            },
        }
    }

    fn three_router_topology() -> Topology {
        let mut t = Topology::new(1);
        t.routers.insert(
            "R1".into(),
            router(
                vec![
                    ("FastEthernet0/0", interface("10.0.12.1", Some(10), Some(("R2", "FastEthernet0/0")))),
                    // Neighbor never captured.
                    ("FastEthernet0/1", interface("10.0.19.1", Some(10), Some(("R9", "FastEthernet0/0")))),
                ],
                &["eigrp", "ospf"],
            ),
        );
        t.routers.insert(
            "R2".into(),
            router(
                vec![
                    ("FastEthernet0/0", interface("10.0.12.2", Some(10), Some(("R1", "FastEthernet0/0")))),
                    // Remote interface does not exist on R10.
                    ("FastEthernet0/1", interface("10.0.210.2", Some(10), Some(("R10", "FastEthernet3/0")))),
                ],
                &["ospf"],
            ),
        );
        t.routers.insert(
            "R10".into(),
            router(
                vec![("FastEthernet0/0", interface("10.0.100.1", None, None))],
                &["ospf"],
            ),
        );
        t
    }

    #[test]
    fn assembles_both_directions_and_drops_unresolved() {
        let rows = assemble(&three_router_topology());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key(), (1, "R1", "R2"));
        assert_eq!(rows[1].key(), (1, "R2", "R1"));
        assert_eq!(rows[0].a.routing, "ospf,eigrp");
        assert_eq!(rows[0].b.routing, "ospf");
        assert_eq!(rows[0].a.neighbor.as_deref(), Some("R2"));
        assert_eq!(rows[0].b.ip.as_deref(), Some("10.0.12.2"));
    }

    #[test]
    fn clean_keeps_one_row_per_pair() {
        let rows = assemble(&three_router_topology());
        let cleaned = clean(rows, TimerField::HelloA);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].key(), (1, "R1", "R2"));
    }

    #[test]
    fn clean_drops_rows_missing_reference_timer() {
        let mut r = row(1, "R1", "R2");
        r.a.hello = None;
        let kept = row(1, "R3", "R4");
        let cleaned = clean(vec![r, kept.clone()], TimerField::HelloA);
        assert_eq!(cleaned, vec![kept]);
    }

    #[test]
    fn reference_field_is_configurable() {
        let mut r = row(1, "R1", "R2");
        r.a.hello = None;
        assert_eq!(clean(vec![r.clone()], TimerField::DeadA).len(), 1);
        r.a.dead = None;
        assert!(clean(vec![r], TimerField::DeadA).is_empty());
        assert_eq!(TimerField::from_column("dead_b"), Some(TimerField::DeadB));
        assert_eq!(TimerField::from_column("mtu_a"), None);
    }

    #[test]
    fn natural_order_for_router_names() {
        let mut names = vec!["R10", "R2", "R1", "R12"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["R1", "R2", "R10", "R12"]);
    }

    #[test]
    fn sort_uses_plain_string_order() {
        let mut rows: Vec<LabeledRow> = [row(2, "R1", "R2"), row(1, "R2", "R3"), row(1, "R10", "R1")]
            .into_iter()
            .map(|row| LabeledRow {
                row,
                labels: LabelVector::default(),
            })
            .collect();
        sort_labeled(&mut rows);
        let keys: Vec<_> = rows.iter().map(|r| r.row.key()).collect();
        assert_eq!(keys, vec![(1, "R10", "R1"), (1, "R2", "R3"), (2, "R1", "R2")]);
    }
}
