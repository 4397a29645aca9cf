use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{OptionData, WireFields};

/// An address pool, written on the wire as `"<start>-<end>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pool {
    pool: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    pub option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_class")]
    pub client_class: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Pool {
    pub(crate) fn new(pool: String) -> Self {
        Self {
            pool,
            option_data: Vec::new(),
            client_class: None,
            extra: Map::new(),
        }
    }

    /// The range string exactly as stored.
    pub fn pool(&self) -> &str {
        &self.pool
    }
}

impl WireFields for Pool {
    const PROTECTED: &'static [&'static str] = &["pool"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// A DHCPv6 prefix delegation pool.
///
/// `(prefix, prefix_len)` identifies the pool across the whole configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PdPool {
    prefix: String,
    #[serde(alias = "prefix_len")]
    prefix_len: u8,
    #[serde(alias = "delegated_len")]
    pub delegated_len: u8,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "excluded_prefix")]
    pub excluded_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "excluded_prefix_len")]
    pub excluded_prefix_len: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    pub option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_class")]
    pub client_class: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PdPool {
    pub(crate) fn new(prefix: String, prefix_len: u8, delegated_len: u8) -> Self {
        Self {
            prefix,
            prefix_len,
            delegated_len,
            excluded_prefix: None,
            excluded_prefix_len: None,
            option_data: Vec::new(),
            client_class: None,
            extra: Map::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub(crate) fn matches(&self, prefix: &str, prefix_len: u8) -> bool {
        self.prefix == prefix && self.prefix_len == prefix_len
    }
}

impl WireFields for PdPool {
    const PROTECTED: &'static [&'static str] = &["prefix", "prefix-len"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
