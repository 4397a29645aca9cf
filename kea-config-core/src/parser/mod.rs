//! Typed editing of one DHCP daemon section.
//!
//! A [`Parser`] owns a working copy of a configuration document. Subnets are
//! held in an arena keyed by id; shared networks keep only their own record
//! and the arena remembers which network each subnet belongs to. Lookups
//! return `None` on a miss. Mutations check every precondition first and
//! either apply completely or return a [`ParserError`] with nothing changed.

use std::fmt::Debug;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde_json::{Map, Value};
use tracing::debug;

use crate::arena::SubnetArena;
use crate::error::ParserError;
use crate::model::storage::{ReservationStorage, SubnetStorage};
use crate::model::{
    is_valid_subnet_id, HostIdentifierType, OptionData, Pool, ReservationRecord, SharedNetwork,
    SubnetId, SubnetRecord, ROUTERS_OPTION_CODE,
};

mod dhcp4;
mod dhcp6;

pub use dhcp4::{Dhcp4, Dhcp4Parser};
pub use dhcp6::{Dhcp6, Dhcp6Parser};

const SHARED_NETWORKS: &str = "shared-networks";

/// Address family of a daemon section.
///
/// Implemented by the [`Dhcp4`] and [`Dhcp6`] markers; the trait is sealed
/// through its storage bounds.
pub trait Family {
    /// Root key of the daemon section.
    const DAEMON: &'static str;
    /// Key of the subnet lists, both at daemon level and inside shared networks.
    const SUBNET_KEY: &'static str;
    /// Identifier kinds this family's reservations can carry.
    const IDENTIFIERS: &'static [HostIdentifierType];
    /// Default option space, e.g. `dhcp4`.
    const OPTION_SPACE: &'static str;
    /// Standard option names usable instead of a code in `option-data`.
    const OPTION_NAMES: &'static [(&'static str, u16)];

    type Subnet: SubnetStorage + SubnetRecord<Reservation = Self::Reservation>;
    type Reservation: ReservationStorage + Debug + Clone;

    /// Parse `value` as an address of this family.
    fn parse_address(value: &str) -> Option<IpAddr>;

    /// Parse `value` as a CIDR prefix of this family.
    fn parse_network(value: &str) -> Option<IpNetwork>;
}

/// Working copy of a `Dhcp4` or `Dhcp6` configuration.
#[derive(Debug, Clone)]
pub struct Parser<F: Family> {
    envelope: Map<String, Value>,
    settings: Map<String, Value>,
    networks: Vec<SharedNetwork>,
    subnets: SubnetArena<F::Subnet>,
}

impl<F: Family> Parser<F> {
    /// Project `document` into typed entities.
    ///
    /// Keys other than the subnet lists and `shared-networks` are kept as-is
    /// and written back by [`Parser::to_document`].
    ///
    /// # Errors
    ///
    /// Fails when the daemon section is missing or malformed, when an entity
    /// does not fit its model, and when the document already violates one of
    /// the uniqueness rules the mutations enforce (subnet id, subnet CIDR,
    /// shared-network name, reserved address, delegated prefix).
    pub fn new(document: Value) -> Result<Self, ParserError> {
        let Value::Object(mut envelope) = document else {
            return Err(ParserError::Malformed {
                path: "<root>".to_string(),
                expected: "an object",
            });
        };
        // The placeholder keeps the daemon key at its original position.
        let Some(daemon) = envelope.get_mut(F::DAEMON).map(std::mem::take) else {
            return Err(ParserError::MissingDaemonSection(F::DAEMON));
        };
        let Value::Object(mut settings) = daemon else {
            return Err(ParserError::Malformed {
                path: F::DAEMON.to_string(),
                expected: "an object",
            });
        };

        let global = take_list(&mut settings, F::SUBNET_KEY, F::DAEMON)?;
        let networks = take_list(&mut settings, SHARED_NETWORKS, F::DAEMON)?;

        let mut parser = Self {
            envelope,
            settings,
            networks: Vec::with_capacity(networks.len()),
            subnets: SubnetArena::default(),
        };

        for raw in global {
            let subnet: F::Subnet = serde_json::from_value(raw)?;
            parser.subnets.insert(subnet, None)?;
        }

        for (index, raw) in networks.into_iter().enumerate() {
            let path = format!("{}/{SHARED_NETWORKS}/{index}", F::DAEMON);
            let Value::Object(mut record) = raw else {
                return Err(ParserError::Malformed {
                    path,
                    expected: "an object",
                });
            };
            let members = take_list(&mut record, F::SUBNET_KEY, &path)?;
            let network: SharedNetwork = serde_json::from_value(Value::Object(record))?;
            if parser.get_shared_network(network.name()).is_some() {
                return Err(ParserError::SharedNetworkAlreadyExists(
                    network.name().to_string(),
                ));
            }
            for raw in members {
                let subnet: F::Subnet = serde_json::from_value(raw)?;
                parser
                    .subnets
                    .insert(subnet, Some(network.name().to_string()))?;
            }
            parser.networks.push(network);
        }

        debug!(
            daemon = F::DAEMON,
            subnets = parser.subnets.len(),
            shared_networks = parser.networks.len(),
            "loaded configuration"
        );
        Ok(parser)
    }

    /// Rebuild the full document, including the untouched envelope keys.
    ///
    /// Global subnets, shared networks and each network's subnets keep their
    /// sequence order. Other keys keep their document order; the subnet and
    /// shared-network lists are written after them. Empty lists are left out.
    pub fn to_document(&self) -> Result<Value, ParserError> {
        let mut settings = self.settings.clone();

        let global = subnet_values(self.subnets.members(None))?;
        if !global.is_empty() {
            settings.insert(F::SUBNET_KEY.to_string(), Value::Array(global));
        }

        let mut networks = Vec::with_capacity(self.networks.len());
        for network in &self.networks {
            let Value::Object(mut record) = serde_json::to_value(network)? else {
                return Err(ParserError::Malformed {
                    path: format!("{}/{SHARED_NETWORKS}/{}", F::DAEMON, network.name()),
                    expected: "an object",
                });
            };
            let members = subnet_values(self.subnets.members(Some(network.name())))?;
            if !members.is_empty() {
                record.insert(F::SUBNET_KEY.to_string(), Value::Array(members));
            }
            networks.push(Value::Object(record));
        }
        if !networks.is_empty() {
            settings.insert(SHARED_NETWORKS.to_string(), Value::Array(networks));
        }

        let mut root = self.envelope.clone();
        root.insert(F::DAEMON.to_string(), Value::Object(settings));
        Ok(Value::Object(root))
    }

    /// Daemon-level settings other than subnets and shared networks.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Every subnet: global subnets first, then each shared network's subnets
    /// in network order.
    pub fn subnets(&self) -> impl Iterator<Item = &F::Subnet> + '_ {
        self.subnets.members(None).chain(
            self.networks
                .iter()
                .flat_map(move |network| self.subnets.members(Some(network.name()))),
        )
    }

    pub fn global_subnets(&self) -> impl Iterator<Item = &F::Subnet> + '_ {
        self.subnets.members(None)
    }

    pub fn shared_networks(&self) -> &[SharedNetwork] {
        &self.networks
    }

    /// Member subnets of `name`; empty when the network is unknown.
    pub fn shared_network_subnets<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a F::Subnet> + 'a {
        self.subnets.members(Some(name))
    }

    pub fn get_shared_network(&self, name: &str) -> Option<&SharedNetwork> {
        self.networks.iter().find(|network| network.name() == name)
    }

    pub fn get_shared_network_mut(&mut self, name: &str) -> Option<&mut SharedNetwork> {
        self.networks
            .iter_mut()
            .find(|network| network.name() == name)
    }

    pub fn get_subnet(&self, id: SubnetId) -> Option<&F::Subnet> {
        self.subnets.get(id)
    }

    pub fn get_subnet_mut(&mut self, id: SubnetId) -> Option<&mut F::Subnet> {
        self.subnets.get_mut(id)
    }

    pub fn get_subnet_by_cidr(&self, cidr: &str) -> Option<&F::Subnet> {
        self.subnets
            .id_by_cidr(cidr)
            .and_then(|id| self.subnets.get(id))
    }

    /// The shared network holding the subnet with this CIDR. `None` for
    /// global subnets as well as unknown ones.
    pub fn get_shared_network_by_subnet(&self, cidr: &str) -> Option<&SharedNetwork> {
        let id = self.subnets.id_by_cidr(cidr)?;
        self.owning_network(id)
    }

    pub fn get_shared_network_by_reservation(&self, ip: &str) -> Option<&SharedNetwork> {
        let id = self.subnets.owner_of_address(ip)?;
        self.owning_network(id)
    }

    pub fn get_subnet_by_reservation(&self, ip: &str) -> Option<&F::Subnet> {
        self.subnets
            .owner_of_address(ip)
            .and_then(|id| self.subnets.get(id))
    }

    /// First subnet whose routers option (code 3, or `"name": "routers"`) is
    /// exactly `ip`.
    pub fn get_subnet_by_default_gateway(&self, ip: &str) -> Option<&F::Subnet> {
        self.subnets().find(|subnet| {
            subnet.option_data().iter().any(|option| {
                option_code::<F>(option) == Some(ROUTERS_OPTION_CODE)
                    && option.data.as_deref() == Some(ip)
            })
        })
    }

    /// First subnet holding the `start-end` range `pool`.
    pub fn get_subnet_by_pool(&self, pool: &str) -> Option<&F::Subnet> {
        self.subnets().find(|subnet| subnet.pool(pool).is_some())
    }

    /// First reservation whose `kind` identifier equals `value`.
    ///
    /// # Errors
    ///
    /// [`ParserError::InvalidIdentifierType`] when this family's reservations
    /// cannot carry `kind` (client-id and circuit-id on DHCPv6).
    pub fn get_reservation_by(
        &self,
        kind: HostIdentifierType,
        value: &str,
    ) -> Result<Option<&F::Reservation>, ParserError> {
        if !F::IDENTIFIERS.contains(&kind) {
            return Err(ParserError::InvalidIdentifierType(kind.to_string()));
        }
        Ok(self.find_reservation(kind, value))
    }

    pub fn get_reservation_by_hw_address(&self, hw_address: &str) -> Option<&F::Reservation> {
        self.find_reservation(HostIdentifierType::HwAddress, hw_address)
    }

    pub fn get_reservation_by_flex_id(&self, flex_id: &str) -> Option<&F::Reservation> {
        self.find_reservation(HostIdentifierType::FlexId, flex_id)
    }

    pub fn get_reservation_by_duid(&self, duid: &str) -> Option<&F::Reservation> {
        self.find_reservation(HostIdentifierType::Duid, duid)
    }

    /// The reservation for `ip`. DHCPv6 reservations match when `ip` is any of
    /// their addresses.
    pub fn get_reservation_by_ip(&self, ip: &str) -> Option<&F::Reservation> {
        self.get_subnet_by_reservation(ip)?.reservation_by_ip(ip)
    }

    pub fn get_reservation_by_ip_mut(&mut self, ip: &str) -> Option<&mut F::Reservation> {
        let id = self.subnets.owner_of_address(ip)?;
        self.subnets
            .get_mut(id)?
            .reservations_mut()
            .iter_mut()
            .find(|reservation| reservation.has_address(ip))
    }

    pub fn add_shared_network(&mut self, name: &str) -> Result<&mut SharedNetwork, ParserError> {
        if self.get_shared_network(name).is_some() {
            return Err(ParserError::SharedNetworkAlreadyExists(name.to_string()));
        }
        debug!(name, "added shared network");
        Ok(push_last(
            &mut self.networks,
            SharedNetwork::new(name.to_string()),
        ))
    }

    /// Append a new global subnet.
    ///
    /// # Errors
    ///
    /// Checked in this order: id out of range, id taken, CIDR taken, CIDR not
    /// a prefix of this family.
    pub fn add_subnet(&mut self, id: SubnetId, cidr: &str) -> Result<&mut F::Subnet, ParserError> {
        if !is_valid_subnet_id(id) {
            return Err(ParserError::InvalidSubnetId(id));
        }
        if self.subnets.get(id).is_some() {
            return Err(ParserError::SubnetIdAlreadyExists(id));
        }
        if self.subnets.id_by_cidr(cidr).is_some() {
            return Err(ParserError::SubnetCidrAlreadyExists(cidr.to_string()));
        }
        if F::parse_network(cidr).is_none() {
            return Err(ParserError::InvalidSubnet(cidr.to_string()));
        }

        let subnet = self
            .subnets
            .insert(<F::Subnet as SubnetStorage>::create(id, cidr.to_string()), None)?;
        debug!(subnet_id = id, cidr, "added subnet");
        Ok(subnet)
    }

    /// Move subnet `id` to the end of shared network `name`, from wherever it
    /// currently lives. A subnet already in `name` stays where it is.
    pub fn add_subnet_to_shared_network(
        &mut self,
        id: SubnetId,
        name: &str,
    ) -> Result<&mut F::Subnet, ParserError> {
        if self.get_shared_network(name).is_none() {
            return Err(ParserError::SharedNetworkNotFound(name.to_string()));
        }
        let Some(current) = self.subnets.network_of(id) else {
            return Err(ParserError::SubnetNotFound(id));
        };
        if current == Some(name) {
            return self
                .subnets
                .get_mut(id)
                .ok_or(ParserError::SubnetNotFound(id));
        }

        debug!(subnet_id = id, shared_network = name, "moved subnet into shared network");
        self.subnets
            .reparent(id, Some(name.to_string()))
            .ok_or(ParserError::SubnetNotFound(id))
    }

    /// Reserve `ip` in subnet `id`. Reserved addresses are unique across the
    /// whole configuration.
    pub fn add_reservation_to_subnet(
        &mut self,
        id: SubnetId,
        ip: &str,
    ) -> Result<&mut F::Reservation, ParserError> {
        if self.subnets.owner_of_address(ip).is_some() {
            return Err(ParserError::ReservationAlreadyExists(ip.to_string()));
        }
        let reservation = self
            .subnets
            .push_reservation(id, <F::Reservation as ReservationStorage>::create(ip.to_string()))
            .ok_or(ParserError::SubnetNotFound(id))?;
        debug!(subnet_id = id, ip, "added reservation");
        Ok(reservation)
    }

    pub fn add_dhcp_option_to_subnet(
        &mut self,
        id: SubnetId,
        code: u16,
        data: &str,
    ) -> Result<&mut OptionData, ParserError> {
        let subnet = self
            .subnets
            .get_mut(id)
            .ok_or(ParserError::SubnetNotFound(id))?;
        if has_option::<F>(subnet.option_data(), code) {
            return Err(ParserError::OptionAlreadyExists {
                owner: format!("subnet {id}"),
                code,
            });
        }
        debug!(subnet_id = id, code, "added option to subnet");
        Ok(push_last(
            subnet.option_data_mut(),
            OptionData::new(code, data),
        ))
    }

    pub fn add_dhcp_option_to_shared_network(
        &mut self,
        name: &str,
        code: u16,
        data: &str,
    ) -> Result<&mut OptionData, ParserError> {
        let network = self
            .get_shared_network_mut(name)
            .ok_or_else(|| ParserError::SharedNetworkNotFound(name.to_string()))?;
        if has_option::<F>(network.option_data(), code) {
            return Err(ParserError::OptionAlreadyExists {
                owner: format!("shared network {name:?}"),
                code,
            });
        }
        debug!(shared_network = name, code, "added option to shared network");
        Ok(push_last(
            network.option_data_mut(),
            OptionData::new(code, data),
        ))
    }

    /// Add the range `start`-`end` to subnet `id`.
    ///
    /// The stored range uses the canonical text form of both addresses, so
    /// `2001:DB8::0010` is written as `2001:db8::10`.
    ///
    /// # Errors
    ///
    /// Checked in this order: an endpoint is not an address of this family,
    /// unknown subnet, an endpoint outside the subnet prefix, range already
    /// present in the subnet.
    pub fn add_pool_to_subnet(
        &mut self,
        id: SubnetId,
        start: &str,
        end: &str,
    ) -> Result<&mut Pool, ParserError> {
        let (Some(first), Some(last)) = (F::parse_address(start), F::parse_address(end)) else {
            return Err(ParserError::PoolInvalidAddress {
                start: start.to_string(),
                end: end.to_string(),
            });
        };

        let subnet = self
            .subnets
            .get_mut(id)
            .ok_or(ParserError::SubnetNotFound(id))?;
        let network = F::parse_network(subnet.cidr())
            .ok_or_else(|| ParserError::InvalidSubnet(subnet.cidr().to_string()))?;
        if let Some(outside) = [first, last]
            .into_iter()
            .find(|address| !network.contains(*address))
        {
            return Err(ParserError::PoolAddressNotInSubnet {
                address: outside.to_string(),
                subnet: subnet.cidr().to_string(),
            });
        }

        let range = format!("{first}-{last}");
        if subnet.pool(&range).is_some() {
            return Err(ParserError::PoolAlreadyExists {
                subnet_id: id,
                pool: range,
            });
        }

        debug!(subnet_id = id, pool = %range, "added pool");
        Ok(push_last(subnet.pools_mut(), Pool::new(range)))
    }

    /// Remove the reservation holding `ip` from subnet `id`; `Ok(None)` when
    /// the subnet has no such reservation.
    pub fn remove_reservation(
        &mut self,
        id: SubnetId,
        ip: &str,
    ) -> Result<Option<F::Reservation>, ParserError> {
        if self.subnets.get(id).is_none() {
            return Err(ParserError::SubnetNotFound(id));
        }
        let removed = self.subnets.take_reservation(id, ip);
        if removed.is_some() {
            debug!(subnet_id = id, ip, "removed reservation");
        }
        Ok(removed)
    }

    /// Remove the range `pool` from subnet `id`; `Ok(None)` when absent.
    pub fn remove_subnet_pool(
        &mut self,
        id: SubnetId,
        pool: &str,
    ) -> Result<Option<Pool>, ParserError> {
        let subnet = self
            .subnets
            .get_mut(id)
            .ok_or(ParserError::SubnetNotFound(id))?;
        let pools = subnet.pools_mut();
        let removed = pools
            .iter()
            .position(|existing| existing.pool() == pool)
            .map(|index| pools.remove(index));
        if removed.is_some() {
            debug!(subnet_id = id, pool, "removed pool");
        }
        Ok(removed)
    }

    /// Remove subnet `id` if it is a member of shared network `name`;
    /// `Ok(None)` when it is not.
    pub fn remove_subnet_from_shared_network(
        &mut self,
        id: SubnetId,
        name: &str,
    ) -> Result<Option<F::Subnet>, ParserError> {
        if self.get_shared_network(name).is_none() {
            return Err(ParserError::SharedNetworkNotFound(name.to_string()));
        }
        if self.subnets.network_of(id) != Some(Some(name)) {
            return Ok(None);
        }
        debug!(subnet_id = id, shared_network = name, "removed subnet from shared network");
        Ok(self.subnets.remove(id).map(|(subnet, _)| subnet))
    }

    /// Remove subnet `id`, global or not.
    pub fn remove_subnet(&mut self, id: SubnetId) -> Result<F::Subnet, ParserError> {
        let (subnet, network) = self
            .subnets
            .remove(id)
            .ok_or(ParserError::SubnetNotFound(id))?;
        debug!(subnet_id = id, shared_network = ?network, "removed subnet");
        Ok(subnet)
    }

    /// Remove shared network `name`.
    ///
    /// With `keep_subnets` its subnets are appended to the global subnets in
    /// their current order; otherwise they are removed with it.
    pub fn remove_shared_network(
        &mut self,
        name: &str,
        keep_subnets: bool,
    ) -> Result<SharedNetwork, ParserError> {
        let index = self
            .networks
            .iter()
            .position(|network| network.name() == name)
            .ok_or_else(|| ParserError::SharedNetworkNotFound(name.to_string()))?;

        let members = self.subnets.member_ids(Some(name));
        for id in &members {
            if keep_subnets {
                self.subnets.reparent(*id, None);
            } else {
                self.subnets.remove(*id);
            }
        }

        debug!(
            shared_network = name,
            subnets = members.len(),
            keep_subnets,
            "removed shared network"
        );
        Ok(self.networks.remove(index))
    }

    fn owning_network(&self, id: SubnetId) -> Option<&SharedNetwork> {
        let name = self.subnets.network_of(id)??;
        self.get_shared_network(name)
    }

    fn find_reservation(&self, kind: HostIdentifierType, value: &str) -> Option<&F::Reservation> {
        self.subnets()
            .flat_map(|subnet| subnet.reservations())
            .find(|reservation| matches!(reservation.identifier(kind), Ok(Some(found)) if found == value))
    }
}

fn take_list(
    map: &mut Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Vec<Value>, ParserError> {
    match map.shift_remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ParserError::Malformed {
            path: format!("{parent}/{key}"),
            expected: "a list",
        }),
    }
}

fn subnet_values<'a, S: SubnetRecord + 'a>(
    subnets: impl Iterator<Item = &'a S>,
) -> Result<Vec<Value>, ParserError> {
    subnets
        .map(|subnet| serde_json::to_value(subnet).map_err(ParserError::from))
        .collect()
}

fn option_code<F: Family>(option: &OptionData) -> Option<u16> {
    option.resolved_code(F::OPTION_SPACE, F::OPTION_NAMES)
}

fn has_option<F: Family>(options: &[OptionData], code: u16) -> bool {
    options
        .iter()
        .any(|option| option_code::<F>(option) == Some(code))
}

fn push_last<T>(items: &mut Vec<T>, item: T) -> &mut T {
    items.push(item);
    let last = items.len() - 1;
    &mut items[last]
}
