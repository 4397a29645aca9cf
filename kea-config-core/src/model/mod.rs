//! Typed projections of the sub-documents a parser manipulates.
//!
//! Every model serializes with Kea's hyphenated wire keys and accepts the
//! underscored spelling of its typed fields on input. Keys a model does not
//! know about are kept in its `extra` map and written back unchanged, so a
//! document survives parse → mutate → serialize without losing settings.
//!
//! Identity fields (ids, names, addresses, prefixes) and parser-managed child
//! collections are only reachable through getters. Everything else is a public
//! field and can be changed in place, or in bulk with
//! [`WireFields::update_fields`]. Passthrough keys are read with
//! [`WireFields::extra`] and written with [`WireFields::set_field`], so they can
//! never shadow a typed or protected key on output.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ParserError;

mod option_data;
mod pool;
mod reservation;
mod shared_network;
pub(crate) mod storage;
mod subnet;

pub use option_data::{
    OptionData, DHCP4_OPTION_NAMES, DHCP6_OPTION_NAMES, ROUTERS_OPTION_CODE,
};
pub use pool::{PdPool, Pool};
pub use reservation::{HostIdentifierType, Reservation4, Reservation6, ReservationRecord};
pub use shared_network::SharedNetwork;
pub use subnet::{Subnet4, Subnet6, SubnetRecord};

/// Kea subnet identifier. Valid values are `1..=4294967294`.
pub type SubnetId = u32;

/// Returns `true` when `id` is usable as a subnet identifier.
pub fn is_valid_subnet_id(id: SubnetId) -> bool {
    id != 0 && id != SubnetId::MAX
}

/// Convert a field name to its wire spelling (`valid_lifetime` → `valid-lifetime`).
pub fn wire_key(name: &str) -> String {
    name.replace('_', "-")
}

/// Convert a wire key to its field spelling (`valid-lifetime` → `valid_lifetime`).
pub fn field_name(key: &str) -> String {
    key.replace('-', "_")
}

/// Bulk field assignment through the wire representation.
///
/// This is the counterpart of building an entity from a loose set of named
/// settings: the entity is serialized, the given keys are merged in, and the
/// result is deserialized again so the model validates every value.
pub trait WireFields: Serialize + DeserializeOwned {
    /// Wire keys that `update_fields` refuses to touch.
    const PROTECTED: &'static [&'static str];

    /// Keys this model does not type, re-emitted unchanged on output.
    fn extra(&self) -> &Map<String, Value>;

    /// Set a single key, typed or passthrough. See [`update_fields`](Self::update_fields).
    fn set_field(&mut self, key: &str, value: Value) -> Result<(), ParserError> {
        let mut fields = Map::new();
        fields.insert(key.to_string(), value);
        self.update_fields(fields)
    }

    /// Merge `fields` into this entity.
    ///
    /// Keys may use either spelling. A `null` value removes the key. Nothing
    /// is changed unless every key is accepted and the merged entity is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::ProtectedField`] for identity fields and managed
    /// collections, and [`ParserError::InvalidField`] when the merged value does
    /// not fit the model.
    fn update_fields(&mut self, fields: Map<String, Value>) -> Result<(), ParserError> {
        let fields: Vec<(String, Value)> = fields
            .into_iter()
            .map(|(key, value)| (wire_key(&key), value))
            .collect();
        if let Some((key, _)) = fields
            .iter()
            .find(|(key, _)| Self::PROTECTED.contains(&key.as_str()))
        {
            return Err(ParserError::ProtectedField(key.clone()));
        }

        let Value::Object(mut current) = serde_json::to_value(&*self)? else {
            return Err(ParserError::Malformed {
                path: "<entity>".to_string(),
                expected: "an object",
            });
        };
        for (key, value) in fields {
            if value.is_null() {
                current.shift_remove(&key);
            } else {
                current.insert(key, value);
            }
        }

        *self = serde_json::from_value(Value::Object(current)).map_err(ParserError::InvalidField)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{field_name, is_valid_subnet_id, wire_key, Subnet4, WireFields};
    use crate::error::ParserError;

    #[test]
    fn key_normalization_is_bidirectional() {
        assert_eq!(wire_key("valid_lifetime"), "valid-lifetime");
        assert_eq!(field_name("valid-lifetime"), "valid_lifetime");
        assert_eq!(wire_key(&field_name("pd-pools")), "pd-pools");
    }

    #[test]
    fn subnet_id_bounds() {
        assert!(!is_valid_subnet_id(0));
        assert!(is_valid_subnet_id(1));
        assert!(is_valid_subnet_id(4_294_967_294));
        assert!(!is_valid_subnet_id(u32::MAX));
    }

    #[test]
    fn update_fields_accepts_both_spellings_and_keeps_unknown_keys() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");
        let fields = json!({
            "valid_lifetime": 600,
            "renew-timer": 300,
            "ddns-qualifying-suffix": "example.org",
        });
        let serde_json::Value::Object(fields) = fields else {
            panic!("object literal");
        };
        subnet.update_fields(fields).expect("update");

        assert_eq!(subnet.valid_lifetime, Some(600));
        assert_eq!(subnet.renew_timer, Some(300));
        assert_eq!(
            subnet.extra().get("ddns-qualifying-suffix"),
            Some(&json!("example.org"))
        );
    }

    #[test]
    fn update_fields_rejects_identity_keys_without_partial_change() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");
        let serde_json::Value::Object(fields) = json!({"valid-lifetime": 600, "id": 9}) else {
            panic!("object literal");
        };

        let err = subnet.update_fields(fields).expect_err("id is protected");
        assert!(matches!(err, ParserError::ProtectedField(key) if key == "id"));
        assert_eq!(subnet.valid_lifetime, None);
        assert_eq!(subnet.id(), 7);
    }

    #[test]
    fn update_fields_validates_types() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");
        let serde_json::Value::Object(fields) = json!({"valid-lifetime": "forever"}) else {
            panic!("object literal");
        };

        let err = subnet.update_fields(fields).expect_err("wrong type");
        assert!(matches!(err, ParserError::InvalidField(_)));
    }

    #[test]
    fn set_field_refuses_managed_keys() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");

        for key in ["id", "subnet", "reservations", "option_data"] {
            let err = subnet
                .set_field(key, json!([]))
                .expect_err("managed key");
            assert!(matches!(err, ParserError::ProtectedField(_)));
        }
        assert!(subnet.extra().is_empty());
    }

    #[test]
    fn set_field_routes_typed_keys_to_their_field() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");
        subnet.set_field("valid-lifetime", json!(900)).expect("typed");
        subnet.set_field("relay", json!({"ip-addresses": []})).expect("passthrough");

        assert_eq!(subnet.valid_lifetime, Some(900));
        assert!(!subnet.extra().contains_key("valid-lifetime"));
        assert_eq!(subnet.extra().get("relay"), Some(&json!({"ip-addresses": []})));
    }

    #[test]
    fn update_fields_null_removes_key() {
        let mut subnet = Subnet4::new(7, "192.0.2.0/24");
        subnet.valid_lifetime = Some(600);
        let serde_json::Value::Object(fields) = json!({"valid-lifetime": null}) else {
            panic!("object literal");
        };

        subnet.update_fields(fields).expect("update");
        assert_eq!(subnet.valid_lifetime, None);
    }
}
