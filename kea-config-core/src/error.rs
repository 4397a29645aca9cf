use thiserror::Error;

use crate::model::SubnetId;

/// Errors raised by parser mutations and document loading.
///
/// Lookups never produce these; a miss is reported as `None`. Every mutation
/// validates fully before changing anything, so an `Err` always leaves the
/// configuration untouched.
#[derive(Debug, Error)]
pub enum ParserError {
    /// A subnet with this id is already present (globally or in a shared network).
    #[error("subnet id {0} is already used in this configuration")]
    SubnetIdAlreadyExists(SubnetId),
    /// A subnet with this CIDR is already present.
    #[error("subnet {0} is already defined in this configuration")]
    SubnetCidrAlreadyExists(String),
    /// A shared network with this name is already present.
    #[error("shared network {0:?} already exists")]
    SharedNetworkAlreadyExists(String),
    /// No shared network with this name.
    #[error("shared network {0:?} does not exist")]
    SharedNetworkNotFound(String),
    /// No subnet with this id.
    #[error("subnet id {0} does not exist")]
    SubnetNotFound(SubnetId),
    /// Some subnet already reserves this address.
    #[error("a reservation for {0} already exists")]
    ReservationAlreadyExists(String),
    /// The owning subnet or shared network already carries this option code.
    #[error("option code {code} is already set on {owner}")]
    OptionAlreadyExists {
        /// Human readable owner, e.g. `subnet 12` or `shared network "lan"`.
        owner: String,
        /// The colliding option code.
        code: u16,
    },
    /// The subnet already holds an identical pool range.
    #[error("pool {pool} already exists in subnet {subnet_id}")]
    PoolAlreadyExists {
        /// Owning subnet.
        subnet_id: SubnetId,
        /// The colliding `start-end` range.
        pool: String,
    },
    /// A pool boundary lies outside the subnet prefix.
    #[error("pool address {address} is outside subnet {subnet}")]
    PoolAddressNotInSubnet {
        /// Offending boundary address.
        address: String,
        /// CIDR of the target subnet.
        subnet: String,
    },
    /// A pool boundary is not an address of the parser's family.
    #[error("pool range {start}-{end} contains an invalid address")]
    PoolInvalidAddress {
        /// Requested first address.
        start: String,
        /// Requested last address.
        end: String,
    },
    /// Unknown or unsupported host reservation identifier type.
    #[error("{0:?} is not a valid host reservation identifier type")]
    InvalidIdentifierType(String),
    /// Another subnet already delegates this prefix.
    #[error("delegated prefix {prefix}/{prefix_len} already exists in subnet {subnet_id}")]
    PdPoolAlreadyExists {
        /// Delegated prefix.
        prefix: String,
        /// Prefix length.
        prefix_len: u8,
        /// Subnet that currently owns the prefix.
        subnet_id: SubnetId,
    },
    /// The subnet holds no PD pool with this prefix.
    #[error("delegated prefix {prefix}/{prefix_len} not found in subnet {subnet_id}")]
    PdPoolNotFound {
        /// Subnet that was searched.
        subnet_id: SubnetId,
        /// Delegated prefix.
        prefix: String,
        /// Prefix length.
        prefix_len: u8,
    },
    /// Subnet id outside `1..4294967295`.
    #[error("subnet id {0} is out of range (1 to 4294967294)")]
    InvalidSubnetId(SubnetId),
    /// CIDR that does not parse as a prefix of the parser's family.
    #[error("{0:?} is not a valid subnet prefix for this address family")]
    InvalidSubnet(String),
    /// Root object lacks the daemon section (`Dhcp4`/`Dhcp6`).
    #[error("configuration has no {0} section")]
    MissingDaemonSection(&'static str),
    /// A JSON value had the wrong shape, e.g. a list where an object was expected.
    #[error("malformed configuration at {path}: expected {expected}")]
    Malformed {
        /// Location inside the document.
        path: String,
        /// What the model expected to find.
        expected: &'static str,
    },
    /// A sub-document could not be converted into its model.
    #[error("invalid configuration document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
    /// `update_fields` tried to overwrite an identity field or a managed collection.
    #[error("field {0:?} cannot be changed through update_fields")]
    ProtectedField(String),
    /// `update_fields` produced a value the model rejects.
    #[error("invalid value for field: {0}")]
    InvalidField(serde_json::Error),
}
