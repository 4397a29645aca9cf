//! Subnet storage keyed by id.
//!
//! Global and shared-network subnets live in one map. Each slot records the
//! name of its owning shared network (`None` for global subnets) and an
//! ordering stamp; moving a subnet between parents rewrites those two fields
//! instead of splicing lists. Secondary indices over CIDR, reserved address
//! and delegated prefix keep the configuration-wide uniqueness checks O(1).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::ParserError;
use crate::model::storage::{PdPoolStorage, SubnetStorage};
use crate::model::{is_valid_subnet_id, PdPool, ReservationRecord, SubnetId, SubnetRecord};

#[derive(Debug, Clone)]
struct Slot<S> {
    subnet: S,
    network: Option<String>,
    stamp: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct SubnetArena<S> {
    slots: HashMap<SubnetId, Slot<S>>,
    order: BTreeMap<u64, SubnetId>,
    next_stamp: u64,
    by_cidr: HashMap<String, SubnetId>,
    by_address: HashMap<String, SubnetId>,
    by_prefix: HashMap<(String, u8), SubnetId>,
}

impl<S> Default for SubnetArena<S> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
            by_cidr: HashMap::new(),
            by_address: HashMap::new(),
            by_prefix: HashMap::new(),
        }
    }
}

impl<S: SubnetStorage> SubnetArena<S> {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: SubnetId) -> Option<&S> {
        self.slots.get(&id).map(|slot| &slot.subnet)
    }

    pub(crate) fn get_mut(&mut self, id: SubnetId) -> Option<&mut S> {
        self.slots.get_mut(&id).map(|slot| &mut slot.subnet)
    }

    /// `None` if the subnet is unknown, `Some(None)` for a global subnet.
    pub(crate) fn network_of(&self, id: SubnetId) -> Option<Option<&str>> {
        self.slots.get(&id).map(|slot| slot.network.as_deref())
    }

    pub(crate) fn id_by_cidr(&self, cidr: &str) -> Option<SubnetId> {
        self.by_cidr.get(cidr).copied()
    }

    pub(crate) fn owner_of_address(&self, ip: &str) -> Option<SubnetId> {
        self.by_address.get(ip).copied()
    }

    pub(crate) fn owner_of_prefix(&self, prefix: &str, prefix_len: u8) -> Option<SubnetId> {
        self.by_prefix
            .get(&(prefix.to_string(), prefix_len))
            .copied()
    }

    /// Subnets owned by `network` (`None` = global), in sequence order.
    pub(crate) fn members<'a>(
        &'a self,
        network: Option<&'a str>,
    ) -> impl Iterator<Item = &'a S> + 'a {
        self.order
            .values()
            .filter_map(|id| self.slots.get(id))
            .filter(move |slot| slot.network.as_deref() == network)
            .map(|slot| &slot.subnet)
    }

    /// Member ids of `network` (`None` = global), in sequence order.
    pub(crate) fn member_ids(&self, network: Option<&str>) -> Vec<SubnetId> {
        self.members(network).map(SubnetRecord::id).collect()
    }

    /// Store `subnet` at the end of `network`'s sequence.
    ///
    /// Every key the subnet carries is checked against the indices first; on
    /// error nothing is stored.
    pub(crate) fn insert(
        &mut self,
        subnet: S,
        network: Option<String>,
    ) -> Result<&mut S, ParserError> {
        let id = subnet.id();
        if !is_valid_subnet_id(id) {
            return Err(ParserError::InvalidSubnetId(id));
        }
        if self.slots.contains_key(&id) {
            return Err(ParserError::SubnetIdAlreadyExists(id));
        }
        if self.by_cidr.contains_key(subnet.cidr()) {
            return Err(ParserError::SubnetCidrAlreadyExists(subnet.cidr().to_string()));
        }

        let mut addresses = HashSet::new();
        for reservation in subnet.reservations() {
            for ip in reservation.addresses() {
                if self.by_address.contains_key(ip) || !addresses.insert(ip) {
                    return Err(ParserError::ReservationAlreadyExists(ip.to_string()));
                }
            }
        }

        let pd_keys = subnet.pd_keys();
        let mut prefixes = HashSet::new();
        for key in &pd_keys {
            let owner = match self.by_prefix.get(key) {
                Some(owner) => Some(*owner),
                None if !prefixes.insert(key) => Some(id),
                None => None,
            };
            if let Some(owner) = owner {
                return Err(ParserError::PdPoolAlreadyExists {
                    prefix: key.0.clone(),
                    prefix_len: key.1,
                    subnet_id: owner,
                });
            }
        }

        self.by_cidr.insert(subnet.cidr().to_string(), id);
        for ip in addresses {
            self.by_address.insert(ip.to_string(), id);
        }
        for key in pd_keys {
            self.by_prefix.insert(key, id);
        }

        let stamp = self.take_stamp();
        self.order.insert(stamp, id);
        let slot = Slot {
            subnet,
            network,
            stamp,
        };
        Ok(&mut self.slots.entry(id).or_insert(slot).subnet)
    }

    /// Remove a subnet from wherever it lives, dropping its index entries.
    pub(crate) fn remove(&mut self, id: SubnetId) -> Option<(S, Option<String>)> {
        let slot = self.slots.remove(&id)?;
        self.order.remove(&slot.stamp);
        self.by_cidr.remove(slot.subnet.cidr());
        for reservation in slot.subnet.reservations() {
            for ip in reservation.addresses() {
                self.by_address.remove(ip);
            }
        }
        for key in slot.subnet.pd_keys() {
            self.by_prefix.remove(&key);
        }
        Some((slot.subnet, slot.network))
    }

    /// Move a subnet to the end of `network`'s sequence.
    pub(crate) fn reparent(&mut self, id: SubnetId, network: Option<String>) -> Option<&mut S> {
        let stamp = self.next_stamp;
        let slot = self.slots.get_mut(&id)?;
        self.order.remove(&slot.stamp);
        self.order.insert(stamp, id);
        self.next_stamp += 1;
        slot.stamp = stamp;
        slot.network = network;
        Some(&mut slot.subnet)
    }

    /// Append a reservation and index its addresses. The caller has already
    /// checked that none of them is taken.
    pub(crate) fn push_reservation(
        &mut self,
        id: SubnetId,
        reservation: S::Reservation,
    ) -> Option<&mut S::Reservation> {
        let slot = self.slots.get_mut(&id)?;
        for ip in reservation.addresses() {
            self.by_address.insert(ip.to_string(), id);
        }
        let reservations = slot.subnet.reservations_mut();
        reservations.push(reservation);
        reservations.last_mut()
    }

    /// Remove the reservation holding `ip` from subnet `id`.
    pub(crate) fn take_reservation(&mut self, id: SubnetId, ip: &str) -> Option<S::Reservation> {
        let slot = self.slots.get_mut(&id)?;
        let reservations = slot.subnet.reservations_mut();
        let index = reservations
            .iter()
            .position(|reservation| reservation.has_address(ip))?;
        let reservation = reservations.remove(index);
        for address in reservation.addresses() {
            self.by_address.remove(address);
        }
        Some(reservation)
    }

    fn take_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }
}

impl<S: PdPoolStorage> SubnetArena<S> {
    pub(crate) fn push_pd_pool(&mut self, id: SubnetId, pd_pool: PdPool) -> Option<&mut PdPool> {
        let slot = self.slots.get_mut(&id)?;
        self.by_prefix
            .insert((pd_pool.prefix().to_string(), pd_pool.prefix_len()), id);
        let pd_pools = slot.subnet.pd_pools_mut();
        pd_pools.push(pd_pool);
        pd_pools.last_mut()
    }

    pub(crate) fn take_pd_pool(
        &mut self,
        id: SubnetId,
        prefix: &str,
        prefix_len: u8,
    ) -> Option<PdPool> {
        let slot = self.slots.get_mut(&id)?;
        let pd_pools = slot.subnet.pd_pools_mut();
        let index = pd_pools
            .iter()
            .position(|pd_pool| pd_pool.prefix() == prefix && pd_pool.prefix_len() == prefix_len)?;
        let pd_pool = pd_pools.remove(index);
        self.by_prefix
            .remove(&(pd_pool.prefix().to_string(), pd_pool.prefix_len()));
        Some(pd_pool)
    }
}
