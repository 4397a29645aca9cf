use std::path::PathBuf;

use kea_config_core::{read_document, Dhcp6Parser, HostIdentifierType, ParserError};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn load() -> Dhcp6Parser {
    let document =
        read_document(fixture("fixtures/dhcp6_config.json")).expect("fixture should parse");
    Dhcp6Parser::new(document).expect("fixture should load")
}

#[test]
fn reservation_matches_any_of_its_addresses() {
    let parser = load();

    for ip in ["2001:db8:1::10", "2001:db8:1::11"] {
        let reservation = parser
            .get_reservation_by_ip(ip)
            .expect("reservation should be found");
        assert_eq!(reservation.hostname.as_deref(), Some("ws1"));
    }
    assert_eq!(
        parser
            .get_shared_network_by_reservation("2001:db8:2::5")
            .map(|network| network.name()),
        Some("backbone")
    );
    assert!(parser.get_reservation_by_ip("2001:db8:9000::").is_none());
}

#[test]
fn identifier_lookups() {
    let parser = load();

    let by_duid = parser
        .get_reservation_by(HostIdentifierType::Duid, "01:02:03:04:05:06:07:08")
        .expect("duid is a v6 identifier")
        .expect("reservation present");
    assert_eq!(by_duid.ip_addresses()[0], "2001:db8:1::10");

    assert!(parser.get_reservation_by_hw_address("aa:bb:cc:dd:ee:01").is_some());
    assert!(parser.get_reservation_by_flex_id("'printer'").is_some());
    assert!(matches!(
        parser.get_reservation_by(HostIdentifierType::ClientId, "01:02"),
        Err(ParserError::InvalidIdentifierType(_))
    ));
}

#[test]
fn pd_pool_lookup_covers_shared_networks() {
    let parser = load();

    assert_eq!(
        parser
            .get_subnet_from_pd_pool("2001:db8:a000::", 52)
            .map(|subnet| subnet.id()),
        Some(2)
    );
    assert!(parser.get_subnet_from_pd_pool("2001:db8:a000::", 48).is_none());
}

#[test]
fn pd_pool_collision_names_existing_owner() {
    let mut parser = Dhcp6Parser::new(serde_json::json!({"Dhcp6": {}})).expect("empty");
    parser.add_subnet(100, "2001:db8:100::/64").expect("subnet A");
    parser.add_subnet(200, "2001:db8:200::/64").expect("subnet B");

    let pd_pool = parser
        .add_pd_pool(100, "2001:db8::", 52, 64)
        .expect("first pd pool");
    assert_eq!(pd_pool.prefix(), "2001:db8::");
    assert_eq!(pd_pool.prefix_len(), 52);

    let err = parser
        .add_pd_pool(200, "2001:db8::", 52, 64)
        .expect_err("prefix already delegated");
    assert!(matches!(
        err,
        ParserError::PdPoolAlreadyExists { prefix_len: 52, subnet_id: 100, .. }
    ));
    assert!(parser
        .get_subnet(200)
        .is_some_and(|subnet| subnet.pd_pools().is_empty()));
}

#[test]
fn pd_pool_collision_with_loaded_subnet_in_shared_network() {
    let mut parser = load();

    let err = parser
        .add_pd_pool(1, "2001:db8:a000::", 52, 60)
        .expect_err("owned by subnet 2");
    assert!(matches!(err, ParserError::PdPoolAlreadyExists { subnet_id: 2, .. }));
}

#[test]
fn v6_pool_is_stored_in_canonical_form() {
    let mut parser = load();

    let pool = parser
        .add_pool_to_subnet(1, "2001:DB8:1::0:0300", "2001:db8:1::03ff")
        .expect("pool inside subnet");
    assert_eq!(pool.pool(), "2001:db8:1::300-2001:db8:1::3ff");

    let err = parser
        .add_pool_to_subnet(1, "192.0.2.1", "192.0.2.2")
        .expect_err("v4 endpoints");
    assert!(matches!(err, ParserError::PoolInvalidAddress { .. }));
}

#[test]
fn removing_subnet_frees_its_reservations_and_prefixes() {
    let mut parser = load();

    parser.remove_subnet(2).expect("subnet 2 exists");
    assert!(parser.get_reservation_by_ip("2001:db8:2::5").is_none());
    assert!(parser.get_subnet_from_pd_pool("2001:db8:a000::", 52).is_none());

    parser
        .add_pd_pool(1, "2001:db8:a000::", 52, 60)
        .expect("prefix released");
    parser
        .add_reservation_to_subnet(1, "2001:db8:2::5")
        .expect("address released");
}
