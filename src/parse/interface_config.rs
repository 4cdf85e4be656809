//! `show run | section interface`: addressing and OSPF authentication keys.

use std::collections::BTreeMap;

use crate::model::{InterfaceRecord, OspfRecord};

/// Key id under which a plain-text (`authentication-key`) secret is stored.
pub const SIMPLE_KEY_ID: &str = "simple";

/// Parse the running-config interface section.
///
/// Every `interface <name>` line opens a record, so this fragment defines
/// which interfaces exist on the router. Any OSPF authentication line creates
/// the record's OSPF sub-record, even when no key has been seen yet.
pub fn parse_interface_config(text: &str) -> BTreeMap<String, InterfaceRecord> {
    let mut interfaces: BTreeMap<String, InterfaceRecord> = BTreeMap::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        let parts: Vec<&str> = line.split_whitespace().collect();

        if line.starts_with("interface") {
            current = parts.get(1).map(|name| name.to_string());
            if let Some(name) = &current {
                interfaces.entry(name.clone()).or_default();
            }
            continue;
        }

        let Some(record) = current.as_ref().and_then(|name| interfaces.get_mut(name)) else {
            continue;
        };

        if line.starts_with("ip address") {
            if parts.len() >= 4 {
                record.ip = Some(parts[2].to_string());
                record.subnet = Some(parts[3].to_string());
            }
        } else if line.starts_with("ip ospf authentication-key") {
            if let Some(secret) = parts.last() {
                let ospf = record.ospf.get_or_insert_with(OspfRecord::default);
                ospf.auth_keys = BTreeMap::from([(SIMPLE_KEY_ID.to_string(), secret.to_string())]);
            }
        } else if line.starts_with("ip ospf message-digest-key") {
            // ip ospf message-digest-key <id> md5 [<encryption>] <secret>
            if parts.len() >= 5 {
                let ospf = record.ospf.get_or_insert_with(OspfRecord::default);
                ospf.auth_keys
                    .insert(parts[3].to_string(), parts[parts.len() - 1].to_string());
            }
        } else if line.starts_with("ip ospf authentication") {
            record.ospf.get_or_insert_with(OspfRecord::default);
        }
    }

    interfaces
}
