use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::storage::{PdPoolStorage, ReservationStorage, SubnetStorage};
use super::{
    OptionData, PdPool, Pool, Reservation4, Reservation6, ReservationRecord, SubnetId, WireFields,
};

/// Read access shared by v4 and v6 subnets.
pub trait SubnetRecord: Debug + Clone + Serialize + DeserializeOwned {
    type Reservation: ReservationRecord + Debug + Clone;

    fn id(&self) -> SubnetId;

    /// The subnet prefix as written in the configuration, e.g. `192.0.2.0/24`.
    fn cidr(&self) -> &str;

    fn pools(&self) -> &[Pool];

    fn option_data(&self) -> &[OptionData];

    fn reservations(&self) -> &[Self::Reservation];

    fn pool(&self, pool: &str) -> Option<&Pool> {
        self.pools().iter().find(|existing| existing.pool() == pool)
    }

    fn reservation_by_ip(&self, ip: &str) -> Option<&Self::Reservation> {
        self.reservations()
            .iter()
            .find(|reservation| reservation.has_address(ip))
    }
}

/// A DHCPv4 subnet (`subnet4` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subnet4 {
    id: SubnetId,
    subnet: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pools: Vec<Pool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    reservations: Vec<Reservation4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_class")]
    pub client_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "valid_lifetime")]
    pub valid_lifetime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "renew_timer")]
    pub renew_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "rebind_timer")]
    pub rebind_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "next_server")]
    pub next_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "boot_file_name")]
    pub boot_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "match_client_id")]
    pub match_client_id: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authoritative: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "user_context")]
    pub user_context: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Subnet4 {
    /// A bare subnet, not yet attached to any configuration.
    pub fn new(id: SubnetId, cidr: impl Into<String>) -> Self {
        Self {
            id,
            subnet: cidr.into(),
            pools: Vec::new(),
            option_data: Vec::new(),
            reservations: Vec::new(),
            interface: None,
            client_class: None,
            valid_lifetime: None,
            renew_timer: None,
            rebind_timer: None,
            next_server: None,
            boot_file_name: None,
            match_client_id: None,
            authoritative: None,
            user_context: None,
            extra: Map::new(),
        }
    }

    pub fn id(&self) -> SubnetId {
        self.id
    }
}

impl SubnetRecord for Subnet4 {
    type Reservation = Reservation4;

    fn id(&self) -> SubnetId {
        self.id
    }

    fn cidr(&self) -> &str {
        &self.subnet
    }

    fn pools(&self) -> &[Pool] {
        &self.pools
    }

    fn option_data(&self) -> &[OptionData] {
        &self.option_data
    }

    fn reservations(&self) -> &[Reservation4] {
        &self.reservations
    }
}

impl SubnetStorage for Subnet4 {
    fn create(id: SubnetId, cidr: String) -> Self {
        Self::new(id, cidr)
    }

    fn pools_mut(&mut self) -> &mut Vec<Pool> {
        &mut self.pools
    }

    fn option_data_mut(&mut self) -> &mut Vec<OptionData> {
        &mut self.option_data
    }

    fn reservations_mut(&mut self) -> &mut Vec<Reservation4> {
        &mut self.reservations
    }
}

impl ReservationStorage for Reservation4 {
    fn create(ip_address: String) -> Self {
        Self::new(ip_address)
    }
}

impl WireFields for Subnet4 {
    const PROTECTED: &'static [&'static str] =
        &["id", "subnet", "pools", "option-data", "reservations"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// A DHCPv6 subnet (`subnet6` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subnet6 {
    id: SubnetId,
    subnet: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pools: Vec<Pool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "pd_pools")]
    pd_pools: Vec<PdPool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    reservations: Vec<Reservation6>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "interface_id")]
    pub interface_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_class")]
    pub client_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "valid_lifetime")]
    pub valid_lifetime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "preferred_lifetime")]
    pub preferred_lifetime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "renew_timer")]
    pub renew_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "rebind_timer")]
    pub rebind_timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "rapid_commit")]
    pub rapid_commit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "user_context")]
    pub user_context: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Subnet6 {
    /// A bare subnet, not yet attached to any configuration.
    pub fn new(id: SubnetId, cidr: impl Into<String>) -> Self {
        Self {
            id,
            subnet: cidr.into(),
            pools: Vec::new(),
            pd_pools: Vec::new(),
            option_data: Vec::new(),
            reservations: Vec::new(),
            interface: None,
            interface_id: None,
            client_class: None,
            valid_lifetime: None,
            preferred_lifetime: None,
            renew_timer: None,
            rebind_timer: None,
            rapid_commit: None,
            user_context: None,
            extra: Map::new(),
        }
    }

    pub fn id(&self) -> SubnetId {
        self.id
    }

    pub fn pd_pools(&self) -> &[PdPool] {
        &self.pd_pools
    }

    pub fn pd_pool(&self, prefix: &str, prefix_len: u8) -> Option<&PdPool> {
        self.pd_pools
            .iter()
            .find(|pd_pool| pd_pool.matches(prefix, prefix_len))
    }
}

impl SubnetRecord for Subnet6 {
    type Reservation = Reservation6;

    fn id(&self) -> SubnetId {
        self.id
    }

    fn cidr(&self) -> &str {
        &self.subnet
    }

    fn pools(&self) -> &[Pool] {
        &self.pools
    }

    fn option_data(&self) -> &[OptionData] {
        &self.option_data
    }

    fn reservations(&self) -> &[Reservation6] {
        &self.reservations
    }
}

impl SubnetStorage for Subnet6 {
    fn create(id: SubnetId, cidr: String) -> Self {
        Self::new(id, cidr)
    }

    fn pools_mut(&mut self) -> &mut Vec<Pool> {
        &mut self.pools
    }

    fn option_data_mut(&mut self) -> &mut Vec<OptionData> {
        &mut self.option_data
    }

    fn reservations_mut(&mut self) -> &mut Vec<Reservation6> {
        &mut self.reservations
    }

    fn pd_keys(&self) -> Vec<(String, u8)> {
        self.pd_pools
            .iter()
            .map(|pd_pool| (pd_pool.prefix().to_string(), pd_pool.prefix_len()))
            .collect()
    }
}

impl PdPoolStorage for Subnet6 {
    fn pd_pools_mut(&mut self) -> &mut Vec<PdPool> {
        &mut self.pd_pools
    }
}

impl ReservationStorage for Reservation6 {
    fn create(ip_address: String) -> Self {
        Self::new(ip_address)
    }
}

impl WireFields for Subnet6 {
    const PROTECTED: &'static [&'static str] = &[
        "id",
        "subnet",
        "pools",
        "pd-pools",
        "option-data",
        "reservations",
    ];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
