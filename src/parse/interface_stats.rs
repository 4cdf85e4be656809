//! `show interfaces`: per-interface MTU.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::interface_header;

static RE_MTU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"MTU (\d+) bytes").unwrap());

/// Map interface name → MTU in bytes.
pub fn parse_interface_stats(text: &str) -> BTreeMap<String, u32> {
    let mut mtu = BTreeMap::new();
    let mut current: Option<&str> = None;

    for line in text.lines() {
        if let Some(name) = interface_header(line) {
            current = Some(name);
            continue;
        }
        let Some(name) = current else { continue };
        if let Some(value) = RE_MTU
            .captures(line)
            .and_then(|c| c[1].parse::<u32>().ok())
        {
            mtu.insert(name.to_string(), value);
        }
    }

    mtu
}
