//! Typed reading and editing of Kea DHCPv4/DHCPv6 server configurations.
//!
//! ```no_run
//! use kea_config_core::{read_document, Dhcp4Parser, SubnetRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut parser = Dhcp4Parser::new(read_document("kea-dhcp4.conf")?)?;
//! parser.add_subnet(40123, "192.0.2.32/31")?;
//! parser.add_reservation_to_subnet(40123, "192.0.2.33")?;
//! assert_eq!(parser.get_subnet(40123).map(|s| s.cidr()), Some("192.0.2.32/31"));
//! # Ok(())
//! # }
//! ```

mod arena;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;

pub use document::{
    detect_family, parse_document, read_document, write_document, write_document_file,
    AddressFamily, DocumentError,
};
pub use error::ParserError;
pub use model::{
    HostIdentifierType, OptionData, PdPool, Pool, Reservation4, Reservation6, ReservationRecord,
    SharedNetwork, Subnet4, Subnet6, SubnetId, SubnetRecord, WireFields,
};
pub use parser::{Dhcp4, Dhcp4Parser, Dhcp6, Dhcp6Parser, Family, Parser};
