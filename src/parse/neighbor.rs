//! `show cdp neighbor`: local interface → neighbor router and remote interface.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::normalize_interface_name;
use crate::model::Neighbor;

/// One table row: `R2.cisco  Fas 0/0  165  R S I  3725  Fas 0/1`.
///
/// The local interface follows the device id; the port id is the last
/// `<type> <number>` pair on the line.
static RE_CDP_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<device>[A-Za-z][\w.-]*)\s+(?P<local>[A-Za-z][A-Za-z-]*\s*\d+(?:/\d+)*)\s+.*\s(?P<port>[A-Za-z][A-Za-z-]*\s*\d+(?:/\d+)*)\s*$",
    )
    .unwrap()
});

pub fn parse_neighbors(text: &str) -> BTreeMap<String, Neighbor> {
    let mut neighbors = BTreeMap::new();

    for line in text.lines() {
        let Some(caps) = RE_CDP_ROW.captures(line) else {
            continue;
        };
        // R9.cisco -> R9
        let router = caps["device"]
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();
        let local = normalize_interface_name(&caps["local"]);
        let interface = normalize_interface_name(&caps["port"]);

        neighbors.insert(local, Neighbor { router, interface });
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Capability Codes: R - Router, T - Trans Bridge, B - Source Route Bridge
                  S - Switch, H - Host, I - IGMP, r - Repeater

Device ID        Local Intrfce     Holdtme    Capability  Platform  Port ID
R2.cisco         Fas 0/0           165         R S I      3725      Fas 0/0
R9.cisco         Fas 2/0           127         R S I      3725      Fas 0/1
R3               Gig 1/0           150         R          7206VXR   Gig 0/0
";

    #[test]
    fn parses_rows_and_strips_domain() {
        let neighbors = parse_neighbors(SAMPLE);
        assert_eq!(neighbors.len(), 3);
        assert_eq!(
            neighbors["FastEthernet0/0"],
            Neighbor {
                router: "R2".into(),
                interface: "FastEthernet0/0".into()
            }
        );
        assert_eq!(neighbors["FastEthernet2/0"].router, "R9");
        assert_eq!(neighbors["FastEthernet2/0"].interface, "FastEthernet0/1");
        assert_eq!(neighbors["GigabitEthernet1/0"].router, "R3");
        assert_eq!(neighbors["GigabitEthernet1/0"].interface, "GigabitEthernet0/0");
    }

    #[test]
    fn header_and_legend_are_skipped() {
        let neighbors = parse_neighbors(SAMPLE);
        assert!(neighbors.values().all(|n| n.router.starts_with('R')));
        assert!(parse_neighbors("Device ID        Local Intrfce     Holdtme\n").is_empty());
    }
}
