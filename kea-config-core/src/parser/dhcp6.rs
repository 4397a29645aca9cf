use std::net::{IpAddr, Ipv6Addr};

use ipnetwork::{IpNetwork, Ipv6Network};
use tracing::debug;

use super::{Family, Parser};
use crate::error::ParserError;
use crate::model::{
    HostIdentifierType, PdPool, Reservation6, Subnet6, SubnetId, DHCP6_OPTION_NAMES,
};

/// DHCPv6 marker (`Dhcp6` section, `subnet6` lists).
#[derive(Debug, Clone, Copy)]
pub enum Dhcp6 {}

pub type Dhcp6Parser = Parser<Dhcp6>;

impl Family for Dhcp6 {
    const DAEMON: &'static str = "Dhcp6";
    const SUBNET_KEY: &'static str = "subnet6";
    const IDENTIFIERS: &'static [HostIdentifierType] = &[
        HostIdentifierType::HwAddress,
        HostIdentifierType::FlexId,
        HostIdentifierType::Duid,
    ];

    const OPTION_SPACE: &'static str = "dhcp6";
    const OPTION_NAMES: &'static [(&'static str, u16)] = DHCP6_OPTION_NAMES;

    type Subnet = Subnet6;
    type Reservation = Reservation6;

    fn parse_address(value: &str) -> Option<IpAddr> {
        value.parse::<Ipv6Addr>().ok().map(IpAddr::V6)
    }

    fn parse_network(value: &str) -> Option<IpNetwork> {
        value.parse::<Ipv6Network>().ok().map(IpNetwork::V6)
    }
}

impl Parser<Dhcp6> {
    /// The subnet delegating `prefix`/`prefix_len`, wherever it lives.
    pub fn get_subnet_from_pd_pool(&self, prefix: &str, prefix_len: u8) -> Option<&Subnet6> {
        self.subnets
            .owner_of_prefix(prefix, prefix_len)
            .and_then(|id| self.subnets.get(id))
    }

    /// Delegate `prefix`/`prefix_len` from subnet `id` in chunks of
    /// `delegated_len`.
    ///
    /// # Errors
    ///
    /// [`ParserError::SubnetNotFound`] first, then
    /// [`ParserError::PdPoolAlreadyExists`] naming the subnet that already
    /// delegates the prefix (which may be `id` itself).
    pub fn add_pd_pool(
        &mut self,
        id: SubnetId,
        prefix: &str,
        prefix_len: u8,
        delegated_len: u8,
    ) -> Result<&mut PdPool, ParserError> {
        if self.subnets.get(id).is_none() {
            return Err(ParserError::SubnetNotFound(id));
        }
        if let Some(owner) = self.subnets.owner_of_prefix(prefix, prefix_len) {
            return Err(ParserError::PdPoolAlreadyExists {
                prefix: prefix.to_string(),
                prefix_len,
                subnet_id: owner,
            });
        }

        let pd_pool = self
            .subnets
            .push_pd_pool(
                id,
                PdPool::new(prefix.to_string(), prefix_len, delegated_len),
            )
            .ok_or(ParserError::SubnetNotFound(id))?;
        debug!(subnet_id = id, prefix, prefix_len, delegated_len, "added pd pool");
        Ok(pd_pool)
    }

    pub fn remove_pd_pool(
        &mut self,
        id: SubnetId,
        prefix: &str,
        prefix_len: u8,
    ) -> Result<PdPool, ParserError> {
        if self.subnets.get(id).is_none() {
            return Err(ParserError::SubnetNotFound(id));
        }
        let pd_pool = self
            .subnets
            .take_pd_pool(id, prefix, prefix_len)
            .ok_or_else(|| ParserError::PdPoolNotFound {
                subnet_id: id,
                prefix: prefix.to_string(),
                prefix_len,
            })?;
        debug!(subnet_id = id, prefix, prefix_len, "removed pd pool");
        Ok(pd_pool)
    }
}
