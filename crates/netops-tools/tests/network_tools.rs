//! Built-in tools against the lab inventory

use async_trait::async_trait;
use netops_network::{Inventory, Prober};
use netops_rag::{Chunk, KnowledgeBase, LexicalIndex};
use netops_tools::{build_network_registry, NetworkToolContext, ToolError, ToolRegistry};
use serde_json::json;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingProber {
    probed: Mutex<Vec<Ipv4Addr>>,
    reachable: bool,
}

#[async_trait]
impl Prober for RecordingProber {
    async fn probe(&self, host: Ipv4Addr) -> bool {
        self.probed.lock().unwrap().push(host);
        self.reachable
    }
}

struct Fixture {
    registry: ToolRegistry,
    prober: Arc<RecordingProber>,
    knowledge: Arc<KnowledgeBase>,
}

fn fixture() -> Fixture {
    let prober = Arc::new(RecordingProber {
        probed: Mutex::new(Vec::new()),
        reachable: true,
    });
    let knowledge = Arc::new(KnowledgeBase::default());
    let ctx = NetworkToolContext::new(
        Arc::new(Inventory::builtin().unwrap()),
        prober.clone(),
        knowledge.clone(),
    );
    Fixture {
        registry: build_network_registry(&ctx).unwrap(),
        prober,
        knowledge,
    }
}

#[tokio::test]
async fn test_declared_tools() {
    let f = fixture();
    let names: Vec<String> = f.registry.declarations().into_iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        vec![
            "ping_tool",
            "cmdb_tool",
            "show_vlan_port_tool",
            "show_vlan_ports_all_tool",
            "change_vlan_tool",
            "lookup_docs",
        ]
    );
}

#[tokio::test]
async fn test_cmdb_lookup() {
    let f = fixture();
    let ip = f.registry.execute("cmdb_tool", &json!({"name": "asw1"})).await.unwrap();
    assert_eq!(ip, "192.168.1.10");

    let err = f
        .registry
        .execute("cmdb_tool", &json!({"name": "asw9"}))
        .await
        .unwrap_err();
    assert_eq!(err, ToolError::NotFound("Device with name asw9 not found.".into()));
}

#[tokio::test]
async fn test_read_vlan() {
    let f = fixture();
    let text = f
        .registry
        .execute("show_vlan_port_tool", &json!({"ip": "192.168.1.10", "port": "Gi0/1"}))
        .await
        .unwrap();
    assert_eq!(text, "Port Gi0/1 on device 192.168.1.10 is configured in VLAN 10.");
}

#[tokio::test]
async fn test_disallowed_vlan_leaves_state() {
    let f = fixture();
    let err = f
        .registry
        .execute(
            "change_vlan_tool",
            &json!({"ip": "192.168.1.10", "port": "Gi0/1", "vlan": 999}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotSupported(_)));
    assert_eq!(
        err.to_string(),
        "VLAN 999 is not configured on device asw1 (192.168.1.10)."
    );

    let text = f
        .registry
        .execute("show_vlan_port_tool", &json!({"ip": "192.168.1.10", "port": "Gi0/1"}))
        .await
        .unwrap();
    assert!(text.ends_with("VLAN 10."));
}

#[tokio::test]
async fn test_change_vlan_on_firewall_is_not_found() {
    let f = fixture();
    let err = f
        .registry
        .execute(
            "change_vlan_tool",
            &json!({"ip": "192.168.254.1", "port": "Gi0/1", "vlan": 10}),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ToolError::NotFound("Device with IP 192.168.254.1 not found in the database.".into())
    );

    let err = f
        .registry
        .execute("show_vlan_ports_all_tool", &json!({"ip": "192.168.254.1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(_)));
}

#[tokio::test]
async fn test_change_vlan() {
    let f = fixture();
    let args = json!({"ip": "192.168.1.10", "port": "Gi0/1", "vlan": "20"});
    let first = f.registry.execute("change_vlan_tool", &args).await.unwrap();
    assert_eq!(
        first,
        "VLAN on port Gi0/1 of device asw1 (192.168.1.10) successfully changed to VLAN 20."
    );
    let second = f.registry.execute("change_vlan_tool", &args).await.unwrap();
    assert_eq!(first, second);

    let text = f
        .registry
        .execute("show_vlan_port_tool", &json!({"ip": "192.168.1.10", "port": "Gi0/1"}))
        .await
        .unwrap();
    assert!(text.ends_with("VLAN 20."));
}

#[tokio::test]
async fn test_read_all_natural_order() {
    let f = fixture();
    let text = f
        .registry
        .execute("show_vlan_ports_all_tool", &json!({"ip": "192.168.3.1"}))
        .await
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "VLAN table of device 192.168.3.1:");
    assert_eq!(lines[1], " - Port Ten0/1 → VLAN 1");
    assert_eq!(lines[2], " - Port Ten0/2 → VLAN 99");
    assert_eq!(lines.len(), 9);
}

#[tokio::test]
async fn test_invalid_ip_is_rejected_before_any_action() {
    let f = fixture();
    for bad in ["999.999.999.999", "999.1.1.1", "abc", ""] {
        let calls = [
            ("ping_tool", json!({"ip": bad})),
            ("show_vlan_port_tool", json!({"ip": bad, "port": "Gi0/1"})),
            ("show_vlan_ports_all_tool", json!({"ip": bad})),
            ("change_vlan_tool", json!({"ip": bad, "port": "Gi0/1", "vlan": 20})),
        ];
        for (tool, args) in calls {
            let err = f.registry.execute(tool, &args).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArgument(_)),
                "{} accepted {:?}",
                tool,
                bad
            );
        }
    }
    assert!(f.prober.probed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ping_reports_reachability_as_text() {
    let f = fixture();
    let text = f.registry.execute("ping_tool", &json!({"ip": "8.8.8.8"})).await.unwrap();
    assert_eq!(text, "Host 8.8.8.8 is reachable.");
    assert_eq!(*f.prober.probed.lock().unwrap(), vec![Ipv4Addr::new(8, 8, 8, 8)]);
}

#[tokio::test]
async fn test_lookup_docs() {
    let f = fixture();
    let err = f
        .registry
        .execute("lookup_docs", &json!({"query": "BI"}))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_observation(),
        "error (unavailable): Knowledge base is not loaded."
    );

    f.knowledge
        .publish(Arc::new(LexicalIndex::build(vec![Chunk {
            source: "servers.md".into(),
            index: 0,
            text: "BI server bi-srv01 has address 10.20.0.5".into(),
        }])))
        .await;

    let text = f
        .registry
        .execute("lookup_docs", &json!({"query": "BI"}))
        .await
        .unwrap();
    assert_eq!(text, "[servers.md]\nBI server bi-srv01 has address 10.20.0.5");

    let err = f
        .registry
        .execute("lookup_docs", &json!({"query": "kubernetes"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(_)));
}
