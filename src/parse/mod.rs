//! Best-effort parsers for captured router command output.
//!
//! Each submodule handles the text of exactly one command and returns a
//! partial fragment. Parsers never fail: a line that does not match the
//! expected shape is skipped, so a truncated or noisy capture still yields
//! whatever could be recognized.
//!
//! | Module | Command |
//! |---|---|
//! | [`interface_config`] | `show run \| section interface` |
//! | [`interface_stats`] | `show interfaces` |
//! | [`ospf_interface`] | `show ip ospf interface` |
//! | [`ospf_process`] | `show run \| section router ospf` |
//! | [`neighbor`] | `show cdp neighbor` |
//! | [`protocols`] | `show ip protocols` |

pub mod interface_config;
pub mod interface_stats;
pub mod neighbor;
pub mod ospf_interface;
pub mod ospf_process;
pub mod protocols;

use std::sync::LazyLock;

use regex::Regex;

pub use interface_config::parse_interface_config;
pub use interface_stats::parse_interface_stats;
pub use neighbor::parse_neighbors;
pub use ospf_interface::{OspfInterfaceState, parse_ospf_interfaces};
pub use ospf_process::{OspfProcessConfig, parse_ospf_process};
pub use protocols::{ProtocolSummary, parse_protocols};

/// Protocol whose routes are expected to be redistributed into OSPF.
pub(crate) const COMPANION_PROTOCOL: &str = "eigrp";

/// Unindented interface header line, e.g. `FastEthernet0/0 is up, line protocol is up`.
static RE_INTERFACE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:FastEthernet|GigabitEthernet|TenGigabitEthernet|Ethernet|Serial|Loopback|Tunnel|Vlan|Port-channel)\S*)",
    )
    .unwrap()
});

/// Canonical long interface type names, in abbreviation-match priority order.
const INTERFACE_TYPES: &[&str] = &[
    "FastEthernet",
    "GigabitEthernet",
    "TenGigabitEthernet",
    "Ethernet",
    "Serial",
    "Loopback",
    "Tunnel",
    "Vlan",
    "Port-channel",
];

/// Interface name at the start of an unindented block header line.
pub(crate) fn interface_header(line: &str) -> Option<&str> {
    RE_INTERFACE_HEADER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Expand an abbreviated interface name to its canonical long form.
///
/// Whitespace between type and number is removed, so `Fas 0/1`, `Fa0/1` and
/// `FastEthernet 0/1` all become `FastEthernet0/1`. Unknown prefixes are kept
/// as written.
pub fn normalize_interface_name(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect();
    let split = compact
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
        .unwrap_or(compact.len());
    let (prefix, number) = compact.split_at(split);

    if prefix.len() < 2 {
        return compact;
    }
    let lower = prefix.to_lowercase();
    INTERFACE_TYPES
        .iter()
        .find(|canonical| canonical.to_lowercase().starts_with(&lower))
        .map(|canonical| format!("{canonical}{number}"))
        .unwrap_or(compact)
}

/// Parse the first run of ASCII digits after `keyword ` in `line`.
pub(crate) fn number_after(line: &str, keyword: &str) -> Option<u32> {
    let start = line.find(keyword)? + keyword.len();
    let digits: String = line[start..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_cdp_abbreviations() {
        assert_eq!(normalize_interface_name("Fas 0/1"), "FastEthernet0/1");
        assert_eq!(normalize_interface_name("Fa0/1"), "FastEthernet0/1");
        assert_eq!(normalize_interface_name("Gig 1/0/2"), "GigabitEthernet1/0/2");
        assert_eq!(normalize_interface_name("Ser 2/0"), "Serial2/0");
        assert_eq!(normalize_interface_name("Eth 0"), "Ethernet0");
        assert_eq!(normalize_interface_name("Ten 1/1"), "TenGigabitEthernet1/1");
    }

    #[test]
    fn keeps_canonical_and_unknown_names() {
        assert_eq!(normalize_interface_name("FastEthernet 0/0"), "FastEthernet0/0");
        assert_eq!(normalize_interface_name("Wlan0"), "Wlan0");
        assert_eq!(normalize_interface_name("X1"), "X1");
    }

    #[test]
    fn interface_header_requires_column_zero() {
        assert_eq!(
            interface_header("FastEthernet0/0 is up, line protocol is up"),
            Some("FastEthernet0/0")
        );
        assert_eq!(interface_header("  FastEthernet0/0 is up"), None);
        assert_eq!(interface_header("Internet Address 10.0.0.1/30"), None);
    }

    #[test]
    fn number_after_keyword() {
        assert_eq!(number_after("Timer intervals configured, Hello 10, Dead 40", "Hello"), Some(10));
        assert_eq!(number_after("Timer intervals configured, Hello 10, Dead 40", "Dead"), Some(40));
        assert_eq!(number_after("MTU 1500 bytes, BW 100000 Kbit", "MTU"), Some(1500));
        assert_eq!(number_after("Area backbone", "Area"), None);
        assert_eq!(number_after("nothing here", "Hello"), None);
    }
}
