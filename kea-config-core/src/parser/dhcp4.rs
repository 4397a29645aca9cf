use std::net::{IpAddr, Ipv4Addr};

use ipnetwork::{IpNetwork, Ipv4Network};

use super::{Family, Parser};
use crate::model::{HostIdentifierType, Reservation4, Subnet4, DHCP4_OPTION_NAMES};

/// DHCPv4 marker (`Dhcp4` section, `subnet4` lists).
#[derive(Debug, Clone, Copy)]
pub enum Dhcp4 {}

pub type Dhcp4Parser = Parser<Dhcp4>;

impl Family for Dhcp4 {
    const DAEMON: &'static str = "Dhcp4";
    const SUBNET_KEY: &'static str = "subnet4";
    const IDENTIFIERS: &'static [HostIdentifierType] = &HostIdentifierType::ALL;
    const OPTION_SPACE: &'static str = "dhcp4";
    const OPTION_NAMES: &'static [(&'static str, u16)] = DHCP4_OPTION_NAMES;

    type Subnet = Subnet4;
    type Reservation = Reservation4;

    fn parse_address(value: &str) -> Option<IpAddr> {
        value.parse::<Ipv4Addr>().ok().map(IpAddr::V4)
    }

    fn parse_network(value: &str) -> Option<IpNetwork> {
        value.parse::<Ipv4Network>().ok().map(IpNetwork::V4)
    }
}

impl Parser<Dhcp4> {
    pub fn get_reservation_by_client_id(&self, client_id: &str) -> Option<&Reservation4> {
        self.find_reservation(HostIdentifierType::ClientId, client_id)
    }

    pub fn get_reservation_by_circuit_id(&self, circuit_id: &str) -> Option<&Reservation4> {
        self.find_reservation(HostIdentifierType::CircuitId, circuit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Dhcp4, Family};

    #[test]
    fn only_v4_text_is_accepted() {
        assert!(Dhcp4::parse_address("192.0.2.1").is_some());
        assert!(Dhcp4::parse_address("2001:db8::1").is_none());
        assert!(Dhcp4::parse_network("192.0.2.0/24").is_some());
        assert!(Dhcp4::parse_network("192.0.2.0/33").is_none());
    }
}
