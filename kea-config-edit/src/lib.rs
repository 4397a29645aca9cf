//! Offline editing of Kea DHCP configuration files.
//!
//! The binary loads a `Dhcp4` or `Dhcp6` document with
//! [`kea_config_core`], and this library provides the pieces it is built
//! from:
//!
//! - [`plan`]: TOML edit plans and their application to a parser
//! - [`summary`]: per-subnet counts for the `show` command
//! - [`report`]: colored terminal rendering of a summary
//!
//! No Kea server is contacted; all edits happen on the document in memory and
//! are written back only when every edit succeeds.

pub mod plan;
pub mod report;
pub mod summary;
