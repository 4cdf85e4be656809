//! Human-readable mismatch reports, one per topology.
//!
//! Each raised label becomes a block naming the routers and interfaces
//! involved, the conflicting values, and what to change. Pair labels are
//! reported once per unordered router pair, redistribution once per router,
//! and router-id conflicts once per shared id.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;

use crate::dataset::{Endpoint, LabeledRow};
use crate::labels::Label;

const RULE: &str = "=========================================================";

/// Long interface type names and their short forms.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("TenGigabitEthernet", "Te"),
    ("GigabitEthernet", "Gi"),
    ("FastEthernet", "Fa"),
    ("Ethernet", "Et"),
    ("Serial", "Se"),
    ("Loopback", "Lo"),
    ("Port-channel", "Po"),
    ("Tunnel", "Tu"),
    ("Vlan", "Vl"),
];

/// `FastEthernet0/1` → `Fa0/1`. Unknown names are returned compacted.
pub fn short_interface_name(name: &str) -> String {
    let compact: String = name.split_whitespace().collect();
    SHORT_NAMES
        .iter()
        .find_map(|(long, short)| compact.strip_prefix(long).map(|rest| format!("{short}{rest}")))
        .unwrap_or(compact)
}

/// One report block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Block title, e.g. `Mismatch between R1 and R2`.
    pub heading: String,
    /// First detail line, e.g. `Hello Interval Mismatch`.
    pub title: String,
    pub details: Vec<String>,
    pub remedy: Vec<String>,
}

impl Finding {
    fn between(a: &str, b: &str, title: impl Into<String>) -> Self {
        Self {
            heading: format!("Mismatch between {a} and {b}"),
            title: title.into(),
            details: Vec::new(),
            remedy: Vec::new(),
        }
    }

    fn on(router: &str, title: impl Into<String>) -> Self {
        Self {
            heading: format!("Mismatch on {router}"),
            title: title.into(),
            details: Vec::new(),
            remedy: Vec::new(),
        }
    }

    fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    fn fix(mut self, line: impl Into<String>) -> Self {
        self.remedy.push(line.into());
        self
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!("=== {} ===", self.heading), RULE.to_string()];
        lines.push(format!("- {} :", self.title));
        lines.extend(self.details.iter().cloned());
        lines.push(RULE.to_string());
        lines.push("+ Remedy :".to_string());
        lines.extend(self.remedy.iter().cloned());
        lines.push(RULE.to_string());
        lines.join("\n")
    }
}

fn show<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "none".to_string(), |v| v.to_string())
}

fn side(end: &Endpoint) -> String {
    format!("{} {}", end.router, short_interface_name(&end.interface))
}

fn value_pair(a: &Endpoint, b: &Endpoint, name: &str, va: String, vb: String) -> Finding {
    Finding::between(&a.router, &b.router, format!("{name} Mismatch"))
        .detail(format!("\t* {} : {va}", side(a)))
        .detail(format!("\t* {} : {vb}", side(b)))
}

fn value_finding(a: &Endpoint, b: &Endpoint, name: &str, va: String, vb: String) -> Finding {
    value_pair(a, b, name, va, vb).fix(format!("\t* Use the same {name} on {} and {}", a.router, b.router))
}

fn passive_finding(a: &Endpoint, b: &Endpoint) -> Finding {
    let f = value_pair(a, b, "Passive Interface", show(&a.passive), show(&b.passive));
    let remove = |end: &Endpoint| {
        format!(
            "\t* Remove passive-interface from {} on {}.",
            short_interface_name(&end.interface),
            end.router
        )
    };
    match (a.is_passive(), b.is_passive()) {
        (true, false) => f.fix(remove(a)),
        (false, true) => f.fix(remove(b)),
        _ => f
            .fix("\t* Make the passive-interface configuration consistent on both sides.")
            .fix("\t* No interface that should form an OSPF adjacency may be passive."),
    }
}

fn key_lines(f: Finding, end: &Endpoint) -> Finding {
    let mut f = f.detail(format!("\t* {} :", side(end)));
    if end.auth_keys.is_empty() {
        f = f.detail(format!("\t\t* {}", end.auth_type));
    }
    for (id, secret) in &end.auth_keys {
        let id = if id.is_empty() { "key" } else { id.as_str() };
        f = f.detail(format!("\t\t* {id} : {secret}"));
    }
    f
}

fn auth_key_finding(a: &Endpoint, b: &Endpoint) -> Finding {
    use crate::model::AuthType::{MessageDigest, None as NoAuth, Simple};

    let base = Finding::between(&a.router, &b.router, "auth_key Mismatch");
    match (a.auth_type, b.auth_type) {
        (MessageDigest, MessageDigest) => key_lines(key_lines(base, a), b)
            .fix("\t* Use the same authentication key (id and secret) on both routers."),
        (MessageDigest, Simple | NoAuth) => key_lines(key_lines(base, a), b)
            .fix(format!("\t* {} and {} use different authentication types", a.router, b.router))
            .fix("\t* Use the same authentication type and authentication key"),
        (Simple | NoAuth, MessageDigest) => key_lines(key_lines(base, b), a)
            .fix(format!("\t* {} and {} use different authentication types", a.router, b.router))
            .fix("\t* Use the same authentication type and authentication key"),
        (Simple, Simple) => key_lines(key_lines(base, a), b).fix("\t* Use the same authentication key"),
        _ => value_finding(
            a,
            b,
            "auth_key",
            crate::dataset::table::format_auth_keys(&a.auth_keys),
            crate::dataset::table::format_auth_keys(&b.auth_keys),
        ),
    }
}

fn redistribute_finding(router: &str) -> Finding {
    Finding::on(router, "Redistribute Mismatch")
        .detail("\t* EIGRP routes are not redistributed into OSPF")
        .detail("\tor")
        .detail("\t* the \"redistribute\" command lacks the \"subnets\" keyword")
        .fix("\t* Add \"redistribute eigrp <as number> subnets\" under router ospf")
}

/// Router id of every router seen in the rows, first occurrence wins.
fn router_ids(rows: &[LabeledRow]) -> BTreeMap<String, Option<String>> {
    let mut ids = BTreeMap::new();
    for r in rows {
        for end in [&r.row.a, &r.row.b] {
            ids.entry(end.router.clone()).or_insert_with(|| end.router_id.clone());
        }
    }
    ids
}

fn router_id_findings(rows: &[LabeledRow]) -> Vec<Finding> {
    let ids = router_ids(rows);
    let mut by_id: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (router, id) in &ids {
        if let Some(id) = id {
            by_id.entry(id).or_default().insert(router);
        }
    }

    by_id
        .iter()
        .filter(|(_, routers)| routers.len() > 1)
        .map(|(id, routers)| {
            let names: Vec<&str> = routers.iter().copied().collect();
            let mut f = Finding::between(names[0], names[1], "Router ID Mismatch");
            for name in &names {
                f = f.detail(format!("\t* {name} : {id}"));
            }
            f = f.fix("\t* OSPF router ids :");
            for (router, rid) in &ids {
                let marker = if routers.contains(router.as_str()) { " <-" } else { "" };
                f = f.fix(format!("\t\t- {router} : {}{marker}", show(rid)));
            }
            f.fix("\n\t* Change the router ids so that every router has a unique id.")
        })
        .collect()
}

/// Findings for the rows of one topology, in row order.
pub fn findings(rows: &[LabeledRow]) -> Vec<Finding> {
    let mut out = Vec::new();
    let mut seen: HashSet<(Label, String, String)> = HashSet::new();

    for labeled in rows {
        let (a, b) = (&labeled.row.a, &labeled.row.b);
        let (lo, hi) = if a.router <= b.router {
            (a.router.clone(), b.router.clone())
        } else {
            (b.router.clone(), a.router.clone())
        };

        for label in labeled.labels.raised() {
            let finding = match label {
                Label::HelloMismatch => value_finding(a, b, "Hello Interval", show(&a.hello), show(&b.hello)),
                Label::DeadMismatch => value_finding(a, b, "Dead Interval", show(&a.dead), show(&b.dead)),
                Label::AreaMismatch => value_finding(a, b, "Area", show(&a.area), show(&b.area)),
                Label::MtuMismatch => value_finding(a, b, "MTU", show(&a.mtu), show(&b.mtu)),
                Label::NetworkTypeMismatch => value_finding(
                    a,
                    b,
                    "Network Type",
                    show(&a.network_type),
                    show(&b.network_type),
                ),
                Label::PassiveMismatch => passive_finding(a, b),
                Label::AuthMismatch => {
                    value_finding(a, b, "ospf auth", a.auth_type.to_string(), b.auth_type.to_string())
                }
                Label::AuthKeyMismatch => auth_key_finding(a, b),
                Label::RedistributeMismatch | Label::RouterIdMismatch => continue,
            };
            if seen.insert((label, lo.clone(), hi.clone())) {
                out.push(finding);
            }
        }
    }

    let mut reported: HashSet<&str> = HashSet::new();
    for labeled in rows.iter().filter(|r| r.labels.get(Label::RedistributeMismatch)) {
        for end in [&labeled.row.a, &labeled.row.b] {
            if end.routing == "ospf,eigrp" && !end.redistribute && reported.insert(&end.router) {
                out.push(redistribute_finding(&end.router));
            }
        }
    }

    if rows.iter().any(|r| r.labels.get(Label::RouterIdMismatch)) {
        out.extend(router_id_findings(rows));
    }
    out
}

/// Full report text for one topology.
pub fn render(rows: &[LabeledRow]) -> String {
    let findings = findings(rows);
    if findings.is_empty() {
        return "[OK] No mismatch found in this topology.\n".to_string();
    }
    let mut text = findings
        .iter()
        .map(Finding::render)
        .collect::<Vec<_>>()
        .join("\n\n");
    text.push('\n');
    text
}

/// Report text per topology present in `rows`.
pub fn render_by_topology(rows: &[LabeledRow]) -> BTreeMap<u32, String> {
    let mut grouped: BTreeMap<u32, Vec<LabeledRow>> = BTreeMap::new();
    for r in rows {
        grouped.entry(r.row.topology).or_default().push(r.clone());
    }
    grouped
        .into_iter()
        .map(|(topology, rows)| (topology, render(&rows)))
        .collect()
}
