//! Rule-based mismatch labeling.
//!
//! Nine labels are decided from one row alone; `RouterIDMismatch` needs the
//! whole topology, so labeling works per topology: first collect the routers
//! whose id is shared with another router name, then label each row.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::dataset::{AdjacencyRow, Endpoint, LabeledRow};
use crate::labels::{Label, LabelVector};

/// Canonical protocol list of a router running both protocols.
const MUTUAL_REDISTRIBUTION: &str = "ospf,eigrp";

/// Router names whose id is claimed by at least two distinct router names.
///
/// Rows may span several topologies; only the rows passed in are consulted,
/// so callers group by topology first. Missing ids never count as shared.
pub fn duplicated_routers(rows: &[AdjacencyRow]) -> HashSet<String> {
    let mut by_id: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in rows {
        for end in [&row.a, &row.b] {
            if let Some(id) = end.router_id.as_deref() {
                by_id.entry(id).or_default().insert(&end.router);
            }
        }
    }

    by_id
        .into_values()
        .filter(|names| names.len() > 1)
        .flatten()
        .map(str::to_string)
        .collect()
}

fn text_differs(a: Option<&str>, b: Option<&str>) -> bool {
    let norm = |v: Option<&str>| v.unwrap_or("none").trim().to_lowercase();
    norm(a) != norm(b)
}

/// A missing numeric value on either side counts as different.
fn value_differs<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

fn auth_key_mismatch(a: &Endpoint, b: &Endpoint) -> bool {
    match (a.auth_keys.is_empty(), b.auth_keys.is_empty()) {
        (true, true) => false,
        (true, false) | (false, true) => true,
        (false, false) => !a
            .auth_keys
            .iter()
            .any(|(id, secret)| b.auth_keys.get(id) == Some(secret)),
    }
}

/// Runs both protocols but does not redistribute between them.
fn missing_redistribution(end: &Endpoint) -> bool {
    end.routing == MUTUAL_REDISTRIBUTION && !end.redistribute
}

/// Label one row against a precomputed duplicated-router set.
pub fn label_row(row: &AdjacencyRow, duplicated: &HashSet<String>) -> LabelVector {
    let (a, b) = (&row.a, &row.b);
    let mut labels = LabelVector::default();

    labels.set(Label::HelloMismatch, value_differs(a.hello, b.hello));
    labels.set(Label::DeadMismatch, value_differs(a.dead, b.dead));
    labels.set(
        Label::NetworkTypeMismatch,
        text_differs(a.network_type.as_deref(), b.network_type.as_deref()),
    );
    labels.set(Label::AreaMismatch, value_differs(a.area, b.area));
    labels.set(
        Label::AuthMismatch,
        text_differs(Some(a.auth_type.as_str()), Some(b.auth_type.as_str())),
    );
    labels.set(Label::AuthKeyMismatch, auth_key_mismatch(a, b));
    labels.set(Label::MtuMismatch, value_differs(a.mtu, b.mtu));
    labels.set(Label::PassiveMismatch, a.is_passive() || b.is_passive());
    labels.set(
        Label::RedistributeMismatch,
        missing_redistribution(a) || missing_redistribution(b),
    );
    labels.set(
        Label::RouterIdMismatch,
        duplicated.contains(&a.router) || duplicated.contains(&b.router),
    );

    labels
}

/// Label cleaned rows, computing router-id duplication per topology.
/// Output order follows input order.
pub fn label_dataset(rows: &[AdjacencyRow]) -> Vec<LabeledRow> {
    let mut by_topology: BTreeMap<u32, Vec<AdjacencyRow>> = BTreeMap::new();
    for row in rows {
        by_topology.entry(row.topology).or_default().push(row.clone());
    }
    let duplicated: BTreeMap<u32, HashSet<String>> = by_topology
        .iter()
        .map(|(id, rows)| (*id, duplicated_routers(rows)))
        .collect();

    let labeled: Vec<LabeledRow> = rows
        .iter()
        .map(|row| LabeledRow {
            labels: label_row(row, &duplicated[&row.topology]),
            row: row.clone(),
        })
        .collect();

    let raised = labeled.iter().filter(|r| r.labels.any()).count();
    tracing::info!(
        rows = labeled.len(),
        topologies = by_topology.len(),
        flagged = raised,
        "labeled adjacency rows"
    );
    labeled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::row;
    use crate::dataset::table::parse_auth_keys;
    use crate::model::AuthType;

    fn labels(row: &AdjacencyRow) -> LabelVector {
        label_row(row, &duplicated_routers(std::slice::from_ref(row)))
    }

    #[test]
    fn healthy_link_raises_nothing() {
        assert!(!labels(&row(1, "R1", "R2")).any());
    }

    #[test]
    fn hello_and_dead_timers() {
        let mut r = row(1, "R1", "R2");
        r.b.hello = Some(30);
        let l = labels(&r);
        assert!(l.get(Label::HelloMismatch));
        assert!(!l.get(Label::DeadMismatch));
    }

    #[test]
    fn missing_numeric_value_differs() {
        let mut r = row(1, "R1", "R2");
        r.a.mtu = None;
        assert!(labels(&r).get(Label::MtuMismatch));
        r.b.mtu = None;
        assert!(labels(&r).get(Label::MtuMismatch));
    }

    #[test]
    fn text_fields_compare_case_insensitively() {
        let mut r = row(1, "R1", "R2");
        r.a.network_type = Some("BROADCAST".into());
        assert!(!labels(&r).get(Label::NetworkTypeMismatch));
        r.b.network_type = None;
        assert!(labels(&r).get(Label::NetworkTypeMismatch));
        r.a.network_type = None;
        assert!(!labels(&r).get(Label::NetworkTypeMismatch));

        r.a.auth_type = AuthType::MessageDigest;
        assert!(labels(&r).get(Label::AuthMismatch));
    }

    #[test]
    fn auth_keys_need_one_shared_pair() {
        let mut r = row(1, "R1", "R2");
        r.a.auth_keys = parse_auth_keys("1:keyA;2:keyB");
        r.b.auth_keys = parse_auth_keys("2:keyB");
        assert!(!labels(&r).get(Label::AuthKeyMismatch));

        r.b.auth_keys = parse_auth_keys("2:keyC");
        assert!(labels(&r).get(Label::AuthKeyMismatch));

        r.b.auth_keys.clear();
        assert!(labels(&r).get(Label::AuthKeyMismatch));

        r.a.auth_keys.clear();
        assert!(!labels(&r).get(Label::AuthKeyMismatch));
    }

    #[test]
    fn passive_on_either_side() {
        let mut r = row(1, "R1", "R2");
        r.b.passive = Some(true);
        assert!(labels(&r).get(Label::PassiveMismatch));
        r.b.passive = None;
        assert!(!labels(&r).get(Label::PassiveMismatch));
    }

    #[test]
    fn redistribution_only_checked_for_both_protocols() {
        let mut r = row(1, "R1", "R2");
        r.a.routing = "ospf,eigrp".into();
        assert!(labels(&r).get(Label::RedistributeMismatch));
        r.a.redistribute = true;
        assert!(!labels(&r).get(Label::RedistributeMismatch));
        r.b.routing = "eigrp".into();
        assert!(!labels(&r).get(Label::RedistributeMismatch));
    }

    #[test]
    fn shared_router_id_flags_every_touching_row() {
        let mut rows = vec![row(1, "R1", "R2"), row(1, "R2", "R3"), row(1, "R4", "R5")];
        rows[1].b.router_id = Some("1.1.1.1".into());

        let labeled = label_dataset(&rows);
        let flags: Vec<bool> = labeled
            .iter()
            .map(|l| l.labels.get(Label::RouterIdMismatch))
            .collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(
            duplicated_routers(&rows),
            HashSet::from(["R1".to_string(), "R3".to_string()])
        );
    }

    #[test]
    fn router_ids_do_not_leak_across_topologies() {
        let mut rows = vec![row(1, "R1", "R2"), row(2, "R3", "R4")];
        rows[1].a.router_id = Some("1.1.1.1".into());
        assert!(label_dataset(&rows).iter().all(|l| !l.labels.get(Label::RouterIdMismatch)));
    }

    #[test]
    fn missing_router_ids_are_not_duplicates() {
        let mut r = row(1, "R1", "R2");
        r.a.router_id = None;
        r.b.router_id = None;
        assert!(duplicated_routers(&[r]).is_empty());
    }

    #[test]
    fn labels_are_symmetric() {
        let mut r = row(1, "R1", "R2");
        r.a.hello = Some(5);
        r.b.passive = Some(true);
        r.a.auth_keys = parse_auth_keys("1:x");
        r.b.routing = "ospf,eigrp".into();
        assert_eq!(labels(&r), labels(&r.reversed()));
    }

    #[test]
    fn labeling_twice_is_stable() {
        let mut rows = vec![row(1, "R1", "R2"), row(1, "R2", "R3")];
        rows[0].b.area = Some(1);
        let once = label_dataset(&rows);
        let relabeled: Vec<AdjacencyRow> = once.iter().map(|l| l.row.clone()).collect();
        assert_eq!(label_dataset(&relabeled), once);
    }
}
