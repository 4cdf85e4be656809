//! Router record merger: six command fragments → one [`RouterDocument`].

use std::collections::BTreeMap;

use crate::capture::{CaptureSource, CommandKind};
use crate::error::CaptureResult;
use crate::model::{InterfaceRecord, Neighbor, OspfRecord, RouterDocument, Routing, Topology};
use crate::parse::{
    OspfInterfaceState, OspfProcessConfig, ProtocolSummary, parse_interface_config,
    parse_interface_stats, parse_neighbors, parse_ospf_interfaces, parse_ospf_process,
    parse_protocols,
};

/// Parsed output of every command for one router, before merging.
#[derive(Debug, Clone, Default)]
pub struct RouterFragments {
    pub interfaces: BTreeMap<String, InterfaceRecord>,
    pub mtu: BTreeMap<String, u32>,
    pub ospf: BTreeMap<String, OspfInterfaceState>,
    pub process: OspfProcessConfig,
    pub neighbors: BTreeMap<String, Neighbor>,
    pub summary: ProtocolSummary,
}

impl RouterFragments {
    /// Fetch and parse all six captures for `router`. Fails on the first
    /// missing capture so the caller can skip the router as a unit.
    pub fn collect(source: &dyn CaptureSource, router: &str) -> CaptureResult<Self> {
        Ok(Self {
            interfaces: parse_interface_config(&source.fetch(router, CommandKind::InterfaceConfig)?),
            mtu: parse_interface_stats(&source.fetch(router, CommandKind::InterfaceStats)?),
            ospf: parse_ospf_interfaces(&source.fetch(router, CommandKind::OspfInterface)?),
            process: parse_ospf_process(&source.fetch(router, CommandKind::OspfProcess)?),
            neighbors: parse_neighbors(&source.fetch(router, CommandKind::Neighbors)?),
            summary: parse_protocols(&source.fetch(router, CommandKind::Protocols)?),
        })
    }
}

/// Merge one router's fragments.
///
/// The interface-config fragment decides which interfaces exist; the other
/// fragments only enrich interfaces already present. Interfaces without an
/// IP address are dropped at the end.
pub fn merge_router(fragments: RouterFragments) -> RouterDocument {
    let RouterFragments {
        mut interfaces,
        mtu,
        ospf,
        process,
        neighbors,
        summary,
    } = fragments;

    for (name, record) in interfaces.iter_mut() {
        if let Some(value) = mtu.get(name) {
            record.mtu = Some(*value);
        }

        if let Some(state) = ospf.get(name) {
            let sub = record.ospf.get_or_insert_with(OspfRecord::default);
            if state.area.is_some() {
                sub.area = state.area;
            }
            if state.hello.is_some() {
                sub.hello = state.hello;
            }
            if state.dead.is_some() {
                sub.dead = state.dead;
            }
            if state.network_type.is_some() {
                sub.network_type = state.network_type.clone();
            }
            sub.auth_type = state.auth_type;
        }

        if process.passive_interfaces.iter().any(|p| p == name) {
            record.ospf.get_or_insert_with(OspfRecord::default).passive = Some(true);
        } else if let Some(sub) = record.ospf.as_mut() {
            sub.passive = Some(false);
        }

        if let Some(neighbor) = neighbors.get(name) {
            record.neighbor = Some(neighbor.clone());
        }
    }

    interfaces.retain(|_, record| record.ip.is_some());

    RouterDocument {
        router_id: process.router_id.or(summary.router_id),
        interfaces,
        routing: Routing {
            protocols: summary.protocols,
            redistribute: process.redistribute || summary.redistribute,
        },
    }
}

/// Merge every listed router that has a complete capture set.
///
/// A router with a missing capture is skipped with a warning; the topology
/// is built from the remaining routers.
pub fn build_topology(id: u32, source: &dyn CaptureSource, routers: &[String]) -> Topology {
    let mut topology = Topology::new(id);

    for router in routers {
        match RouterFragments::collect(source, router) {
            Ok(fragments) => {
                let document = merge_router(fragments);
                tracing::debug!(
                    topology = id,
                    router = %router,
                    interfaces = document.interfaces.len(),
                    "merged router"
                );
                topology.routers.insert(router.clone(), document);
            }
            Err(e) => {
                tracing::warn!(topology = id, router = %router, error = %e, "incomplete capture, skipping router");
            }
        }
    }

    tracing::info!(
        topology = id,
        routers = topology.routers.len(),
        requested = routers.len(),
        "topology merged"
    );
    topology
}
