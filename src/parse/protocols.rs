//! `show ip protocols`: active routing protocols, redistribution and router-id fallback.

use super::COMPANION_PROTOCOL;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolSummary {
    /// `ospf` / `eigrp` in first-seen order.
    pub protocols: Vec<String>,
    pub redistribute: bool,
    pub router_id: Option<String>,
}

const KNOWN_PROTOCOLS: &[&str] = &["ospf", "eigrp"];

pub fn parse_protocols(text: &str) -> ProtocolSummary {
    let mut summary = ProtocolSummary::default();

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with("Routing Protocol is") {
            for proto in KNOWN_PROTOCOLS {
                if line.contains(proto) && !summary.protocols.iter().any(|p| p == proto) {
                    summary.protocols.push(proto.to_string());
                }
            }
        }

        // Every line overwrites the flag, so only a final
        // `eigrp 100, includes subnets in redistribution` leaves it set.
        summary.redistribute = line.starts_with(COMPANION_PROTOCOL) && line.contains("subnets");

        if line.contains("Router ID") {
            if let Some(id) = line.split_whitespace().last() {
                summary.router_id = Some(id.to_string());
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
*** IP Routing is NSF aware ***

Routing Protocol is \"ospf 1\"
  Outgoing update filter list for all interfaces is not set
  Incoming update filter list for all interfaces is not set
  Router ID 2.2.2.2
  It is an autonomous system boundary router
 Redistributing External Routes from,
    eigrp 100, includes subnets in redistribution
  Number of areas in this router is 1. 1 normal 0 stub 0 nssa
Routing Protocol is \"eigrp 100\"
  EIGRP-IPv4 Protocol for AS(100)
    Router-ID: 2.2.2.2
";

    #[test]
    fn collects_protocols_in_order() {
        let summary = parse_protocols(SAMPLE);
        assert_eq!(summary.protocols, vec!["ospf", "eigrp"]);
        assert_eq!(summary.router_id.as_deref(), Some("2.2.2.2"));
    }

    #[test]
    fn redistribute_with_subnets() {
        let text = "Routing Protocol is \"ospf 1\"\n Redistributing External Routes from,\n    eigrp 100, includes subnets in redistribution\n";
        assert!(parse_protocols(text).redistribute);
    }

    #[test]
    fn later_line_clears_redistribute() {
        let text = "Routing Protocol is \"ospf 1\"\n Redistributing External Routes from,\n    eigrp 100, includes subnets in redistribution\n  Number of areas in this router is 1.\n";
        assert!(!parse_protocols(text).redistribute);
        assert!(!parse_protocols(SAMPLE).redistribute);
    }

    #[test]
    fn redistribute_without_subnets() {
        let text = "Routing Protocol is \"ospf 1\"\n Redistributing External Routes from,\n    eigrp 100\n";
        assert!(!parse_protocols(text).redistribute);
    }

    #[test]
    fn ospf_only_router() {
        let summary = parse_protocols("Routing Protocol is \"ospf 1\"\n  Router ID 9.9.9.9\n");
        assert_eq!(summary.protocols, vec!["ospf"]);
        assert!(!summary.redistribute);
        assert_eq!(summary.router_id.as_deref(), Some("9.9.9.9"));
    }
}
