//! Benchmarks for capture parsing and rule labeling.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ospf_mismatch::dataset::{AdjacencyRow, TimerField, assemble, clean};
use ospf_mismatch::model::{
    InterfaceRecord, Neighbor, OspfRecord, RouterDocument, Routing, Topology,
};
use ospf_mismatch::parse::{parse_interface_config, parse_ospf_interfaces};
use ospf_mismatch::rules::label_dataset;

fn interface_config_text(interfaces: usize) -> String {
    (0..interfaces)
        .map(|i| {
            format!(
                "interface FastEthernet{}/{}\n ip address 10.{}.0.1 255.255.255.252\n \
                 ip ospf message-digest-key 1 md5 key{i}\n!\n",
                i / 4,
                i % 4,
                i
            )
        })
        .collect()
}

fn ospf_interface_text(interfaces: usize) -> String {
    (0..interfaces)
        .map(|i| {
            format!(
                "FastEthernet{}/{} is up, line protocol is up\n  \
                 Internet Address 10.{i}.0.1/30, Area 0, Attached via Network Statement\n  \
                 Process ID 1, Router ID 1.1.1.1, Network Type BROADCAST, Cost: 1\n  \
                 Timer intervals configured, Hello 10, Dead 40, Wait 40, Retransmit 5\n  \
                 Message digest authentication enabled\n",
                i / 4,
                i % 4
            )
        })
        .collect()
}

/// A ring of `n` routers, each linked to the next on FastEthernet0/0 → 0/1.
fn ring_topology(n: usize) -> Topology {
    let mut topology = Topology::new(1);
    for i in 1..=n {
        let next = i % n + 1;
        let prev = if i == 1 { n } else { i - 1 };
        let link = |peer: usize, remote: &str| InterfaceRecord {
            ip: Some(format!("10.{i}.{peer}.1")),
            subnet: Some("255.255.255.0".into()),
            mtu: Some(1500),
            ospf: Some(OspfRecord {
                area: Some(0),
                hello: Some(if i % 7 == 0 { 30 } else { 10 }),
                dead: Some(40),
                network_type: Some("Broadcast".into()),
                passive: Some(false),
                ..Default::default()
            }),
            neighbor: Some(Neighbor {
                router: format!("R{peer}"),
                interface: remote.into(),
            }),
        };
        topology.routers.insert(
            format!("R{i}"),
            RouterDocument {
                router_id: Some(format!("{i}.{i}.{i}.{i}")),
                interfaces: [
                    ("FastEthernet0/0".to_string(), link(next, "FastEthernet0/1")),
                    ("FastEthernet0/1".to_string(), link(prev, "FastEthernet0/0")),
                ]
                .into_iter()
                .collect(),
                routing: Routing {
                    protocols: vec!["ospf".into()],
                    redistribute: false,
                },
            },
        );
    }
    topology
}

fn bench_parse(c: &mut Criterion) {
    let config = interface_config_text(64);
    let ospf = ospf_interface_text(64);

    c.bench_function("parse_interface_config_64", |bench| {
        bench.iter(|| black_box(parse_interface_config(&config)))
    });
    c.bench_function("parse_ospf_interfaces_64", |bench| {
        bench.iter(|| black_box(parse_ospf_interfaces(&ospf)))
    });
}

fn bench_label(c: &mut Criterion) {
    let topology = ring_topology(200);
    let rows: Vec<AdjacencyRow> = clean(assemble(&topology), TimerField::HelloA);

    c.bench_function("assemble_clean_ring_200", |bench| {
        bench.iter(|| black_box(clean(assemble(&topology), TimerField::HelloA)))
    });
    c.bench_function("label_ring_200", |bench| {
        bench.iter(|| black_box(label_dataset(&rows)))
    });
}

criterion_group!(benches, bench_parse, bench_label);
criterion_main!(benches);
