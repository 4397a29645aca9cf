use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{OptionData, WireFields};
use crate::error::ParserError;

/// Host identifier kinds a reservation can be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostIdentifierType {
    HwAddress,
    ClientId,
    CircuitId,
    FlexId,
    Duid,
}

impl HostIdentifierType {
    pub const ALL: [HostIdentifierType; 5] = [
        HostIdentifierType::HwAddress,
        HostIdentifierType::ClientId,
        HostIdentifierType::CircuitId,
        HostIdentifierType::FlexId,
        HostIdentifierType::Duid,
    ];

    /// Wire spelling, as used in `host-reservation-identifiers`.
    pub fn as_str(self) -> &'static str {
        match self {
            HostIdentifierType::HwAddress => "hw-address",
            HostIdentifierType::ClientId => "client-id",
            HostIdentifierType::CircuitId => "circuit-id",
            HostIdentifierType::FlexId => "flex-id",
            HostIdentifierType::Duid => "duid",
        }
    }
}

impl Display for HostIdentifierType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostIdentifierType {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wire = super::wire_key(s.trim());
        HostIdentifierType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wire)
            .ok_or_else(|| ParserError::InvalidIdentifierType(s.to_string()))
    }
}

/// Read access shared by v4 and v6 reservations.
pub trait ReservationRecord {
    /// Reserved addresses (not delegated prefixes).
    fn addresses(&self) -> Vec<&str>;

    /// Value of the given identifier, `Ok(None)` when unset.
    ///
    /// # Errors
    ///
    /// [`ParserError::InvalidIdentifierType`] if this family's reservations
    /// cannot carry `kind` at all.
    fn identifier(&self, kind: HostIdentifierType) -> Result<Option<&str>, ParserError>;

    fn has_address(&self, ip: &str) -> bool {
        self.addresses().contains(&ip)
    }
}

/// A DHCPv4 host reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Reservation4 {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "ip_address")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "hw_address")]
    pub hw_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_id")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "circuit_id")]
    pub circuit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "flex_id")]
    pub flex_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "client_classes")]
    pub client_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    pub option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "next_server")]
    pub next_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "server_hostname")]
    pub server_hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "boot_file_name")]
    pub boot_file_name: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Reservation4 {
    pub(crate) fn new(ip_address: String) -> Self {
        Self {
            ip_address: Some(ip_address),
            hw_address: None,
            client_id: None,
            circuit_id: None,
            flex_id: None,
            duid: None,
            hostname: None,
            client_classes: Vec::new(),
            option_data: Vec::new(),
            next_server: None,
            server_hostname: None,
            boot_file_name: None,
            extra: Map::new(),
        }
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }
}

impl ReservationRecord for Reservation4 {
    fn addresses(&self) -> Vec<&str> {
        self.ip_address.as_deref().into_iter().collect()
    }

    fn identifier(&self, kind: HostIdentifierType) -> Result<Option<&str>, ParserError> {
        let value = match kind {
            HostIdentifierType::HwAddress => &self.hw_address,
            HostIdentifierType::ClientId => &self.client_id,
            HostIdentifierType::CircuitId => &self.circuit_id,
            HostIdentifierType::FlexId => &self.flex_id,
            HostIdentifierType::Duid => &self.duid,
        };
        Ok(value.as_deref())
    }
}

impl WireFields for Reservation4 {
    const PROTECTED: &'static [&'static str] = &["ip-address"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// A DHCPv6 host reservation; it may cover several addresses and prefixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Reservation6 {
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "ip_addresses")]
    ip_addresses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "hw_address")]
    pub hw_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "flex_id")]
    pub flex_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "client_classes")]
    pub client_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    pub option_data: Vec<OptionData>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Reservation6 {
    pub(crate) fn new(ip_address: String) -> Self {
        Self {
            ip_addresses: vec![ip_address],
            prefixes: Vec::new(),
            hw_address: None,
            flex_id: None,
            duid: None,
            hostname: None,
            client_classes: Vec::new(),
            option_data: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn ip_addresses(&self) -> &[String] {
        &self.ip_addresses
    }
}

impl ReservationRecord for Reservation6 {
    fn addresses(&self) -> Vec<&str> {
        self.ip_addresses.iter().map(String::as_str).collect()
    }

    fn identifier(&self, kind: HostIdentifierType) -> Result<Option<&str>, ParserError> {
        let value = match kind {
            HostIdentifierType::HwAddress => &self.hw_address,
            HostIdentifierType::FlexId => &self.flex_id,
            HostIdentifierType::Duid => &self.duid,
            HostIdentifierType::ClientId | HostIdentifierType::CircuitId => {
                return Err(ParserError::InvalidIdentifierType(kind.to_string()))
            }
        };
        Ok(value.as_deref())
    }
}

impl WireFields for Reservation6 {
    const PROTECTED: &'static [&'static str] = &["ip-addresses"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
