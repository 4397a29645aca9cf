use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::WireFields;

/// DHCPv4 option 3, the default gateway list.
pub const ROUTERS_OPTION_CODE: u16 = 3;

/// Standard `dhcp4` option names Kea accepts in place of a code.
pub const DHCP4_OPTION_NAMES: &[(&str, u16)] = &[
    ("subnet-mask", 1),
    ("time-offset", 2),
    ("routers", 3),
    ("time-servers", 4),
    ("name-servers", 5),
    ("domain-name-servers", 6),
    ("log-servers", 7),
    ("host-name", 12),
    ("boot-size", 13),
    ("domain-name", 15),
    ("interface-mtu", 26),
    ("broadcast-address", 28),
    ("static-routes", 33),
    ("ntp-servers", 42),
    ("vendor-encapsulated-options", 43),
    ("netbios-name-servers", 44),
    ("dhcp-server-identifier", 54),
    ("tftp-server-name", 66),
    ("boot-file-name", 67),
    ("domain-search", 119),
    ("classless-static-route", 121),
];

/// Standard `dhcp6` option names Kea accepts in place of a code.
pub const DHCP6_OPTION_NAMES: &[(&str, u16)] = &[
    ("preference", 7),
    ("unicast", 12),
    ("sip-server-dns", 21),
    ("sip-server-addr", 22),
    ("dns-servers", 23),
    ("domain-search", 24),
    ("nis-servers", 27),
    ("sntp-servers", 31),
    ("information-refresh-time", 32),
    ("ntp-server", 56),
    ("bootfile-url", 59),
];

/// One `option-data` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "csv_format")]
    pub csv_format: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "always_send")]
    pub always_send: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl OptionData {
    pub fn new(code: u16, data: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            name: None,
            data: Some(data.into()),
            space: None,
            csv_format: None,
            always_send: None,
            extra: Map::new(),
        }
    }

    /// Option code, absent for entries identified only by `name`.
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// The explicit code, or the code of a standard option given by `name`.
    ///
    /// Names resolve only in the family's own space: `space` unset or equal to
    /// `default_space`.
    pub fn resolved_code(&self, default_space: &str, names: &[(&str, u16)]) -> Option<u16> {
        if self.code.is_some() {
            return self.code;
        }
        if self.space.as_deref().is_some_and(|space| space != default_space) {
            return None;
        }
        let name = self.name.as_deref()?;
        names
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, code)| *code)
    }
}

impl WireFields for OptionData {
    const PROTECTED: &'static [&'static str] = &["code"];

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
