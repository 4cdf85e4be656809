//! `show run | section router ospf`: router-id, redistribution and passive interfaces.

use super::COMPANION_PROTOCOL;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OspfProcessConfig {
    pub router_id: Option<String>,
    /// Value of the last `redistribute eigrp` line: true only if it carried `subnets`.
    pub redistribute: bool,
    pub passive_interfaces: Vec<String>,
}

pub fn parse_ospf_process(text: &str) -> OspfProcessConfig {
    let mut config = OspfProcessConfig::default();
    let redistribute_prefix = format!("redistribute {COMPANION_PROTOCOL}");

    for raw in text.lines() {
        let line = raw.trim();
        let mut parts = line.split_whitespace();

        if line.contains("router-id") {
            if let Some(id) = parts.nth(1) {
                config.router_id = Some(id.to_string());
            }
        }

        // A later redistribute line without `subnets` clears an earlier one.
        if line.starts_with(&redistribute_prefix) {
            config.redistribute = line.contains("subnets");
        }

        if line.contains("passive-interface") {
            if let Some(name) = line.split_whitespace().nth(1) {
                config.passive_interfaces.push(name.to_string());
            }
        }
    }

    config
}
