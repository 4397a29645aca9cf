use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use kea_config_core::{read_document, Dhcp4Parser, Dhcp6Parser, SubnetRecord};
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn apply_writes_edited_config_to_output() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = dir.path().join("kea-dhcp4.conf");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kea-config-edit"));
    cmd.arg("apply")
        .arg(fixture("fixtures/dhcp4_config.json"))
        .arg("--plan")
        .arg(fixture("fixtures/dhcp4_plan.toml"))
        .arg("--output")
        .arg(&out_path)
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("applied 8 edits"));

    let parser = Dhcp4Parser::new(read_document(&out_path).expect("output should parse"))
        .expect("output should load");

    assert_eq!(
        parser.get_subnet(40123).and_then(|subnet| subnet.valid_lifetime),
        Some(600)
    );
    assert_eq!(
        parser
            .get_shared_network_by_subnet("172.16.0.0/24")
            .map(|network| network.name()),
        Some("guests")
    );
    assert_eq!(
        parser
            .get_shared_network("guests")
            .and_then(|network| network.interface.as_deref()),
        Some("eth2")
    );
    assert_eq!(
        parser
            .get_reservation_by_hw_address("0a:0b:0c:0d:0e:0f")
            .and_then(|reservation| reservation.hostname.as_deref()),
        Some("kiosk")
    );
    assert_eq!(
        parser
            .get_subnet_by_default_gateway("172.16.0.1")
            .map(|subnet| subnet.id()),
        Some(300)
    );
    assert!(parser
        .get_subnet(2)
        .is_some_and(|subnet| subnet.pools().is_empty()));
}

#[test]
fn failing_edit_aborts_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config_path = dir.path().join("kea-dhcp4.conf");
    let original = fs::read_to_string(fixture("fixtures/dhcp4_config.json")).expect("fixture");
    fs::write(&config_path, &original).expect("copy fixture");

    let plan_path = dir.path().join("plan.toml");
    fs::write(
        &plan_path,
        r#"
[[edit]]
op = "add-subnet"
id = 500
cidr = "192.0.2.128/25"

[[edit]]
op = "add-reservation"
id = 500
ip = "192.0.2.10"
"#,
    )
    .expect("write plan");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kea-config-edit"));
    cmd.arg("apply")
        .arg(&config_path)
        .arg("--plan")
        .arg(&plan_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("edit #1 (add-reservation) failed"))
        .stderr(predicate::str::contains("192.0.2.10 already exists"));

    let after = fs::read_to_string(&config_path).expect("config still readable");
    assert_eq!(after, original);
}

#[test]
fn dry_run_prints_document_and_leaves_file_alone() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config_path = dir.path().join("kea-dhcp6.conf");
    let original = fs::read_to_string(fixture("fixtures/dhcp6_config.json")).expect("fixture");
    fs::write(&config_path, &original).expect("copy fixture");

    let plan_path = dir.path().join("plan.toml");
    fs::write(
        &plan_path,
        r#"
[[edit]]
op = "add-pd-pool"
id = 1
prefix = "2001:db8:b000::"
prefix-len = 48
delegated-len = 64

[[edit]]
op = "remove-shared-network"
name = "backbone"
keep-subnets = true
"#,
    )
    .expect("write plan");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kea-config-edit"));
    let output = cmd
        .arg("apply")
        .arg(&config_path)
        .arg("--plan")
        .arg(&plan_path)
        .arg("--dry-run")
        .output()
        .expect("command should run");
    assert!(output.status.success());

    let printed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be the edited document");
    let parser = Dhcp6Parser::new(printed).expect("printed document should load");
    assert_eq!(
        parser
            .get_subnet_from_pd_pool("2001:db8:b000::", 48)
            .map(|subnet| subnet.id()),
        Some(1)
    );
    assert!(parser.shared_networks().is_empty());
    assert_eq!(parser.global_subnets().count(), 2);

    let after = fs::read_to_string(&config_path).expect("config still readable");
    assert_eq!(after, original);
}

#[test]
fn pd_pool_edit_on_v4_config_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let plan_path = dir.path().join("plan.toml");
    fs::write(
        &plan_path,
        "[[edit]]\nop = \"remove-pd-pool\"\nid = 1\nprefix = \"2001:db8::\"\nprefix-len = 48\n",
    )
    .expect("write plan");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kea-config-edit"));
    cmd.arg("apply")
        .arg(fixture("fixtures/dhcp4_config.json"))
        .arg("--plan")
        .arg(&plan_path)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available for Dhcp4"));
}
