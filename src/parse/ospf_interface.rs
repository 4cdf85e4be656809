//! `show ip ospf interface`: area, timers, network type and auth mode.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{interface_header, number_after};
use crate::model::AuthType;

static RE_NETWORK_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Network Type (\S+)").unwrap());

/// OSPF runtime state of one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OspfInterfaceState {
    pub area: Option<u32>,
    pub hello: Option<u32>,
    pub dead: Option<u32>,
    pub network_type: Option<String>,
    pub auth_type: AuthType,
}

/// Map interface name → OSPF state. Every interface block starts with
/// `auth_type = none` until an authentication line says otherwise.
pub fn parse_ospf_interfaces(text: &str) -> BTreeMap<String, OspfInterfaceState> {
    let mut states: BTreeMap<String, OspfInterfaceState> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(name) = interface_header(line) {
            states.insert(name.to_string(), OspfInterfaceState::default());
            current = Some(name.to_string());
            continue;
        }
        let Some(state) = current.as_ref().and_then(|name| states.get_mut(name)) else {
            continue;
        };

        if line.contains("Internet Address") && line.contains("Area") {
            if let Some(area) = number_after(line, "Area") {
                state.area = Some(area);
            }
        }

        if line.contains("Timer intervals") {
            if let Some(hello) = number_after(line, "Hello") {
                state.hello = Some(hello);
            }
            if let Some(dead) = number_after(line, "Dead") {
                state.dead = Some(dead);
            }
        }

        if let Some(caps) = RE_NETWORK_TYPE.captures(line) {
            state.network_type = Some(capitalize(caps[1].trim_end_matches(',')));
        }

        if line.contains("Simple password authentication enabled") {
            state.auth_type = AuthType::Simple;
        } else if line.contains("Message digest authentication enabled") {
            state.auth_type = AuthType::MessageDigest;
        }
    }

    states
}

/// Upper-case the first character, lower-case the rest (`BROADCAST` → `Broadcast`).
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
