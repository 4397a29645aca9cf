use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{OptionData, WireFields};

/// A shared network record without its member subnets.
///
/// Membership is tracked by the parser; use
/// [`Parser::shared_network_subnets`](crate::Parser::shared_network_subnets)
/// to list the subnets of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SharedNetwork {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "option_data")]
    option_data: Vec<OptionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "client_class")]
    pub client_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "valid_lifetime")]
    pub valid_lifetime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "user_context")]
    pub user_context: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl SharedNetwork {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            option_data: Vec::new(),
            interface: None,
            client_class: None,
            relay: None,
            valid_lifetime: None,
            user_context: None,
            extra: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option_data(&self) -> &[OptionData] {
        &self.option_data
    }

    pub(crate) fn option_data_mut(&mut self) -> &mut Vec<OptionData> {
        &mut self.option_data
    }
}

impl WireFields for SharedNetwork {
    const PROTECTED: &'static [&'static str] = &["name", "option-data", "subnet4", "subnet6"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
