//! Flannel mode end to end: env file -> interface checks -> `/healthz`.

use std::io::Write;
use std::sync::Arc;

use network_health::config::HealthMode;
use network_health::{Error, HealthChecker};
use tempfile::NamedTempFile;

use crate::helpers::*;

fn env_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn mode(file: &NamedTempFile) -> HealthMode {
    HealthMode::Flannel {
        bridge_interface: "br-a1b2c3".to_string(),
        flannel_interface: "flannel.1".to_string(),
        env_file: file.path().to_path_buf(),
    }
}

fn checker(file: &NamedTempFile, table: StaticTable) -> Result<HealthChecker, Error> {
    HealthChecker::from_mode(
        &mode(file),
        Arc::new(table),
        FakeEcho::new(false),
        FakeHttp::new(&[]),
    )
}

const FLANNEL_ENV: &str = "FLANNEL_NETWORK=172.23.3.0/24
FLANNEL_SUBNET=172.23.3.65/30
FLANNEL_MTU=1450
FLANNEL_IPMASQ=false
";

#[tokio::test]
async fn test_configured_node_is_healthy() {
    let file = env_file(FLANNEL_ENV);
    let table = StaticTable(vec![
        interface("lo", &[("127.0.0.1", 8)]),
        interface("br-a1b2c3", &[("172.23.3.65", 30)]),
        interface("flannel.1", &[("172.23.3.64", 32)]),
    ]);
    let server = TestServer::start(checker(&file, table).unwrap()).await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["name"], "interfaceHealthz br-a1b2c3");
    assert_eq!(outcomes[1]["name"], "interfaceHealthz flannel.1");
    for outcome in &outcomes {
        assert_eq!(outcome["failed"], false, "{}", outcome);
        assert_eq!(
            outcome["description"],
            "Ensure network interface is present and has proper network configuration."
        );
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_missing_overlay_interface() {
    let file = env_file(FLANNEL_ENV);
    let table = StaticTable(vec![interface("br-a1b2c3", &[("172.23.3.65", 30)])]);
    let server = TestServer::start(checker(&file, table).unwrap()).await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes[0]["failed"], false);
    assert_eq!(outcomes[1]["failed"], true);
    assert_eq!(outcomes[1]["message"], "Can't find interface flannel.1.");

    server.shutdown().await;
}

#[tokio::test]
async fn test_bridge_without_address() {
    let file = env_file(FLANNEL_ENV);
    let table = StaticTable(vec![
        interface("br-a1b2c3", &[]),
        interface("flannel.1", &[("172.23.3.64", 32)]),
    ]);
    let server = TestServer::start(checker(&file, table).unwrap()).await;

    let outcomes = server.healthz().await;

    assert_eq!(outcomes[0]["failed"], true);
    assert_eq!(
        outcomes[0]["message"],
        "Missing ip 172.23.3.65 on the interface br-a1b2c3."
    );

    server.shutdown().await;
}

#[test]
fn test_invalid_env_file_fails_startup() {
    let file = env_file("FLANNEL_NETWORK=172.23.3.0/24\n");
    let result = checker(&file, StaticTable(Vec::new()));

    match result {
        Err(Error::Flannel(e)) => assert!(e.is_invalid_configuration()),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("checker built from a file without FLANNEL_SUBNET"),
    }
}
