//! Edit plans: an ordered list of parser operations loaded from TOML.
//!
//! ```toml
//! [[edit]]
//! op = "add-subnet"
//! id = 40123
//! cidr = "192.0.2.32/31"
//! fields = { valid-lifetime = 600 }
//!
//! [[edit]]
//! op = "remove-shared-network"
//! name = "old-lab"
//! keep-subnets = true
//! ```

use std::fs;
use std::path::Path;

use kea_config_core::{
    Dhcp4Parser, Dhcp6Parser, Family, OptionData, ParserError, Parser, Pool, SharedNetwork,
    SubnetId, WireFields,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or applying an edit plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read edit plan {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse edit plan {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    /// The parser refused an edit.
    #[error("edit #{index} ({op}) failed: {source}")]
    Edit {
        index: usize,
        op: &'static str,
        source: ParserError,
    },
    /// A removal matched nothing.
    #[error("edit #{index} ({op}) failed: nothing to remove")]
    NothingRemoved { index: usize, op: &'static str },
    /// The edit only exists for the other address family.
    #[error("edit #{index} ({op}) is not available for {family} configurations")]
    Unsupported {
        index: usize,
        op: &'static str,
        family: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    #[serde(default, rename = "edit")]
    pub edits: Vec<Edit>,
}

/// One parser operation. `fields` tables are merged into the created entity
/// with [`WireFields::update_fields`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum Edit {
    AddSharedNetwork {
        name: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddSubnet {
        id: SubnetId,
        cidr: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddSubnetToSharedNetwork {
        id: SubnetId,
        name: String,
    },
    AddReservation {
        id: SubnetId,
        ip: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddOptionToSubnet {
        id: SubnetId,
        code: u16,
        data: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddOptionToSharedNetwork {
        name: String,
        code: u16,
        data: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddPool {
        id: SubnetId,
        start: String,
        end: String,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    AddPdPool {
        id: SubnetId,
        prefix: String,
        prefix_len: u8,
        delegated_len: u8,
        #[serde(default)]
        fields: Map<String, Value>,
    },
    RemoveReservation {
        id: SubnetId,
        ip: String,
    },
    RemovePool {
        id: SubnetId,
        pool: String,
    },
    RemovePdPool {
        id: SubnetId,
        prefix: String,
        prefix_len: u8,
    },
    RemoveSubnetFromSharedNetwork {
        id: SubnetId,
        name: String,
    },
    RemoveSubnet {
        id: SubnetId,
    },
    RemoveSharedNetwork {
        name: String,
        #[serde(default)]
        keep_subnets: bool,
    },
}

impl Edit {
    /// The `op` tag as written in the plan.
    pub fn op(&self) -> &'static str {
        match self {
            Edit::AddSharedNetwork { .. } => "add-shared-network",
            Edit::AddSubnet { .. } => "add-subnet",
            Edit::AddSubnetToSharedNetwork { .. } => "add-subnet-to-shared-network",
            Edit::AddReservation { .. } => "add-reservation",
            Edit::AddOptionToSubnet { .. } => "add-option-to-subnet",
            Edit::AddOptionToSharedNetwork { .. } => "add-option-to-shared-network",
            Edit::AddPool { .. } => "add-pool",
            Edit::AddPdPool { .. } => "add-pd-pool",
            Edit::RemoveReservation { .. } => "remove-reservation",
            Edit::RemovePool { .. } => "remove-pool",
            Edit::RemovePdPool { .. } => "remove-pd-pool",
            Edit::RemoveSubnetFromSharedNetwork { .. } => "remove-subnet-from-shared-network",
            Edit::RemoveSubnet { .. } => "remove-subnet",
            Edit::RemoveSharedNetwork { .. } => "remove-shared-network",
        }
    }
}

/// Result of applying a single edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Applied,
    NothingRemoved,
    Unsupported,
}

/// A parser that edit plans can be applied to.
pub trait PlanTarget {
    /// Daemon name used in messages.
    const FAMILY: &'static str;

    fn apply_edit(&mut self, edit: Edit) -> Result<Step, ParserError>;
}

impl PlanTarget for Dhcp4Parser {
    const FAMILY: &'static str = "Dhcp4";

    fn apply_edit(&mut self, edit: Edit) -> Result<Step, ParserError> {
        match edit {
            Edit::AddPdPool { .. } | Edit::RemovePdPool { .. } => Ok(Step::Unsupported),
            other => apply_common(self, other),
        }
    }
}

impl PlanTarget for Dhcp6Parser {
    const FAMILY: &'static str = "Dhcp6";

    fn apply_edit(&mut self, edit: Edit) -> Result<Step, ParserError> {
        match edit {
            Edit::AddPdPool {
                id,
                prefix,
                prefix_len,
                delegated_len,
                fields,
            } => {
                let pd_pool = self.add_pd_pool(id, &prefix, prefix_len, delegated_len)?;
                merge_fields(pd_pool, fields)?;
                Ok(Step::Applied)
            }
            Edit::RemovePdPool {
                id,
                prefix,
                prefix_len,
            } => {
                self.remove_pd_pool(id, &prefix, prefix_len)?;
                Ok(Step::Applied)
            }
            other => apply_common(self, other),
        }
    }
}

/// Read and parse an edit plan file.
pub fn load_plan(path: &Path) -> Result<Plan, PlanError> {
    let raw = fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_plan(&raw, path.display().to_string())
}

/// Parse an edit plan from TOML text; `origin` names the source in errors.
pub fn parse_plan(raw: &str, origin: String) -> Result<Plan, PlanError> {
    toml::from_str(raw).map_err(|source| PlanError::Parse {
        path: origin,
        source,
    })
}

/// Apply every edit in order, stopping at the first failure.
///
/// Edits before the failing one stay applied to `parser`; callers that need
/// all-or-nothing behaviour should discard the parser on error.
pub fn apply_plan<P: PlanTarget>(parser: &mut P, plan: Plan) -> Result<usize, PlanError> {
    let total = plan.edits.len();
    for (index, edit) in plan.edits.into_iter().enumerate() {
        let op = edit.op();
        match parser.apply_edit(edit) {
            Ok(Step::Applied) => info!(index, op, "applied edit"),
            Ok(Step::NothingRemoved) => return Err(PlanError::NothingRemoved { index, op }),
            Ok(Step::Unsupported) => {
                return Err(PlanError::Unsupported {
                    index,
                    op,
                    family: P::FAMILY,
                })
            }
            Err(source) => return Err(PlanError::Edit { index, op, source }),
        }
    }
    Ok(total)
}

fn apply_common<F: Family>(parser: &mut Parser<F>, edit: Edit) -> Result<Step, ParserError>
where
    F::Subnet: WireFields,
    F::Reservation: WireFields,
{
    match edit {
        Edit::AddSharedNetwork { name, fields } => {
            merge_fields::<SharedNetwork>(parser.add_shared_network(&name)?, fields)?;
        }
        Edit::AddSubnet { id, cidr, fields } => {
            merge_fields(parser.add_subnet(id, &cidr)?, fields)?;
        }
        Edit::AddSubnetToSharedNetwork { id, name } => {
            parser.add_subnet_to_shared_network(id, &name)?;
        }
        Edit::AddReservation { id, ip, fields } => {
            merge_fields(parser.add_reservation_to_subnet(id, &ip)?, fields)?;
        }
        Edit::AddOptionToSubnet {
            id,
            code,
            data,
            fields,
        } => {
            merge_fields::<OptionData>(parser.add_dhcp_option_to_subnet(id, code, &data)?, fields)?;
        }
        Edit::AddOptionToSharedNetwork {
            name,
            code,
            data,
            fields,
        } => {
            merge_fields::<OptionData>(
                parser.add_dhcp_option_to_shared_network(&name, code, &data)?,
                fields,
            )?;
        }
        Edit::AddPool {
            id,
            start,
            end,
            fields,
        } => {
            merge_fields::<Pool>(parser.add_pool_to_subnet(id, &start, &end)?, fields)?;
        }
        Edit::RemoveReservation { id, ip } => {
            return Ok(removed(parser.remove_reservation(id, &ip)?));
        }
        Edit::RemovePool { id, pool } => {
            return Ok(removed(parser.remove_subnet_pool(id, &pool)?));
        }
        Edit::RemoveSubnetFromSharedNetwork { id, name } => {
            return Ok(removed(parser.remove_subnet_from_shared_network(id, &name)?));
        }
        Edit::RemoveSubnet { id } => {
            parser.remove_subnet(id)?;
        }
        Edit::RemoveSharedNetwork { name, keep_subnets } => {
            parser.remove_shared_network(&name, keep_subnets)?;
        }
        Edit::AddPdPool { .. } | Edit::RemovePdPool { .. } => return Ok(Step::Unsupported),
    }
    Ok(Step::Applied)
}

fn merge_fields<T: WireFields>(entity: &mut T, fields: Map<String, Value>) -> Result<(), ParserError> {
    if fields.is_empty() {
        return Ok(());
    }
    entity.update_fields(fields)
}

fn removed<T>(value: Option<T>) -> Step {
    match value {
        Some(_) => Step::Applied,
        None => Step::NothingRemoved,
    }
}

#[cfg(test)]
mod tests {
    use kea_config_core::{Dhcp4Parser, Dhcp6Parser, ParserError};
    use serde_json::json;

    use super::{apply_plan, parse_plan, Edit, PlanError};

    fn v4() -> Dhcp4Parser {
        Dhcp4Parser::new(json!({"Dhcp4": {}})).expect("empty config")
    }

    #[test]
    fn parses_tagged_edits_with_fields() {
        let plan = parse_plan(
            r#"
[[edit]]
op = "add-subnet"
id = 7
cidr = "192.0.2.0/24"
fields = { valid-lifetime = 600, client_class = "voip" }

[[edit]]
op = "remove-shared-network"
name = "lab"
keep-subnets = true
"#,
            "inline".to_string(),
        )
        .expect("plan should parse");

        assert_eq!(plan.edits.len(), 2);
        assert!(matches!(&plan.edits[0], Edit::AddSubnet { id: 7, fields, .. } if fields.len() == 2));
        assert_eq!(
            plan.edits[1],
            Edit::RemoveSharedNetwork {
                name: "lab".to_string(),
                keep_subnets: true
            }
        );
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        let err = parse_plan("[[edit]]\nop = \"rename-subnet\"\nid = 1\n", "inline".to_string())
            .expect_err("unknown op");
        assert!(matches!(err, PlanError::Parse { .. }));
    }

    #[test]
    fn applies_fields_to_created_entities() {
        let mut parser = v4();
        let plan = parse_plan(
            r#"
[[edit]]
op = "add-subnet"
id = 7
cidr = "192.0.2.0/24"
fields = { valid_lifetime = 600 }

[[edit]]
op = "add-reservation"
id = 7
ip = "192.0.2.9"
fields = { hw-address = "0a:0b:0c:0d:0e:0f" }
"#,
            "inline".to_string(),
        )
        .expect("plan should parse");

        assert_eq!(apply_plan(&mut parser, plan).expect("apply"), 2);
        assert_eq!(
            parser.get_subnet(7).and_then(|subnet| subnet.valid_lifetime),
            Some(600)
        );
        assert!(parser
            .get_reservation_by_hw_address("0a:0b:0c:0d:0e:0f")
            .is_some());
    }

    #[test]
    fn failure_reports_edit_index() {
        let mut parser = v4();
        let plan = parse_plan(
            r#"
[[edit]]
op = "add-subnet"
id = 7
cidr = "192.0.2.0/24"

[[edit]]
op = "add-subnet"
id = 7
cidr = "198.51.100.0/24"
"#,
            "inline".to_string(),
        )
        .expect("plan should parse");

        let err = apply_plan(&mut parser, plan).expect_err("duplicate id");
        assert!(matches!(
            err,
            PlanError::Edit {
                index: 1,
                op: "add-subnet",
                source: ParserError::SubnetIdAlreadyExists(7)
            }
        ));
    }

    #[test]
    fn protected_field_in_plan_is_rejected() {
        let mut parser = v4();
        let plan = parse_plan(
            "[[edit]]\nop = \"add-subnet\"\nid = 7\ncidr = \"192.0.2.0/24\"\nfields = { id = 8 }\n",
            "inline".to_string(),
        )
        .expect("plan should parse");

        let err = apply_plan(&mut parser, plan).expect_err("protected");
        assert!(matches!(
            err,
            PlanError::Edit {
                source: ParserError::ProtectedField(_),
                ..
            }
        ));
    }

    #[test]
    fn removal_of_missing_child_fails() {
        let mut parser = v4();
        parser.add_subnet(7, "192.0.2.0/24").expect("subnet");
        let plan = parse_plan(
            "[[edit]]\nop = \"remove-pool\"\nid = 7\npool = \"192.0.2.10-192.0.2.20\"\n",
            "inline".to_string(),
        )
        .expect("plan should parse");

        let err = apply_plan(&mut parser, plan).expect_err("nothing to remove");
        assert!(matches!(err, PlanError::NothingRemoved { index: 0, .. }));
    }

    #[test]
    fn pd_pool_edits_are_v6_only() {
        let plan_text = r#"
[[edit]]
op = "add-pd-pool"
id = 1
prefix = "2001:db8:8000::"
prefix-len = 48
delegated-len = 56
"#;
        let mut parser = v4();
        let err = apply_plan(
            &mut parser,
            parse_plan(plan_text, "inline".to_string()).expect("plan should parse"),
        )
        .expect_err("v4 has no pd pools");
        assert!(matches!(err, PlanError::Unsupported { family: "Dhcp4", .. }));

        let mut parser = Dhcp6Parser::new(json!({"Dhcp6": {}})).expect("empty config");
        parser.add_subnet(1, "2001:db8:1::/64").expect("subnet");
        apply_plan(
            &mut parser,
            parse_plan(plan_text, "inline".to_string()).expect("plan should parse"),
        )
        .expect("v6 accepts pd pools");
        assert!(parser.get_subnet_from_pd_pool("2001:db8:8000::", 48).is_some());
    }
}
