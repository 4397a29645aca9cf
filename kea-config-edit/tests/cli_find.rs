use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn find(file: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kea-config-edit"));
    cmd.arg("find").arg(fixture(file)).args(args).assert()
}

#[test]
fn find_subnet_by_id_in_shared_network() {
    find("fixtures/dhcp4_config.json", &["--subnet-id", "11"])
        .success()
        .stdout(predicate::str::contains("\"subnet\": \"203.0.113.64/26\""))
        .stdout(predicate::str::contains("\"ddns-qualifying-suffix\""));
}

#[test]
fn find_subnet_by_gateway_and_pool() {
    find("fixtures/dhcp4_config.json", &["--gateway", "198.51.100.1"])
        .success()
        .stdout(predicate::str::contains("\"id\": 2"));
    find(
        "fixtures/dhcp4_config.json",
        &["--pool", "203.0.113.10-203.0.113.60"],
    )
    .success()
    .stdout(predicate::str::contains("\"id\": 10"));
}

#[test]
fn find_reservation_by_identifier() {
    find(
        "fixtures/dhcp4_config.json",
        &["--identifier", "circuit-id='charter950'"],
    )
    .success()
    .stdout(predicate::str::contains("\"ip-address\": \"203.0.113.5\""));

    find(
        "fixtures/dhcp6_config.json",
        &["--identifier", "duid=01:02:03:04:05:06:07:08"],
    )
    .success()
    .stdout(predicate::str::contains("\"hostname\": \"ws1\""));
}

#[test]
fn find_v6_reservation_by_secondary_address() {
    find("fixtures/dhcp6_config.json", &["--reservation-ip", "2001:db8:1::11"])
        .success()
        .stdout(predicate::str::contains("2001:db8:1::10"));
}

#[test]
fn find_miss_exits_non_zero() {
    find("fixtures/dhcp4_config.json", &["--cidr", "10.99.0.0/16"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn find_rejects_unknown_identifier_type() {
    find("fixtures/dhcp4_config.json", &["--identifier", "mac=aa:bb"])
        .failure()
        .stderr(predicate::str::contains("not a valid host reservation identifier type"));
}

#[test]
fn find_rejects_client_id_on_v6() {
    find("fixtures/dhcp6_config.json", &["--identifier", "client-id=01:02"])
        .failure()
        .stderr(predicate::str::contains("client-id"));
}

#[test]
fn find_requires_exactly_one_lookup() {
    find(
        "fixtures/dhcp4_config.json",
        &["--subnet-id", "1", "--cidr", "192.0.2.0/24"],
    )
    .failure();
    find("fixtures/dhcp4_config.json", &[]).failure();
}
