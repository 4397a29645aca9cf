use anyhow::{bail, Context, Result};
use kea_config_core::{
    detect_family, read_document, AddressFamily, Dhcp4Parser, Dhcp6Parser, Family,
    HostIdentifierType, Parser,
};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{FindArgs, Query};

pub fn run_find(args: FindArgs) -> Result<()> {
    let document = read_document(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let found = match detect_family(&document) {
        Some(AddressFamily::Dhcp4) => lookup(
            &Dhcp4Parser::new(document)
                .with_context(|| format!("failed to load {}", args.file.display()))?,
            &args.query,
        )?,
        Some(AddressFamily::Dhcp6) => lookup(
            &Dhcp6Parser::new(document)
                .with_context(|| format!("failed to load {}", args.file.display()))?,
            &args.query,
        )?,
        None => bail!(
            "{} has no single Dhcp4 or Dhcp6 section",
            args.file.display()
        ),
    };

    match found {
        Some(entity) => {
            println!("{}", serde_json::to_string_pretty(&entity)?);
            Ok(())
        }
        None => bail!("not found"),
    }
}

fn lookup<F: Family>(parser: &Parser<F>, query: &Query) -> Result<Option<Value>>
where
    F::Reservation: Serialize,
{
    let found = if let Some(id) = query.subnet_id {
        to_json(parser.get_subnet(id))?
    } else if let Some(cidr) = &query.cidr {
        to_json(parser.get_subnet_by_cidr(cidr))?
    } else if let Some(pool) = &query.pool {
        to_json(parser.get_subnet_by_pool(pool))?
    } else if let Some(gateway) = &query.gateway {
        to_json(parser.get_subnet_by_default_gateway(gateway))?
    } else if let Some(ip) = &query.reservation_ip {
        to_json(parser.get_reservation_by_ip(ip))?
    } else if let Some(identifier) = &query.identifier {
        let Some((kind, value)) = identifier.split_once('=') else {
            bail!("--identifier expects TYPE=VALUE, got {identifier:?}");
        };
        let kind: HostIdentifierType = kind.parse()?;
        to_json(parser.get_reservation_by(kind, value)?)?
    } else {
        bail!("no lookup given");
    };
    Ok(found)
}

fn to_json<T: Serialize>(entity: Option<&T>) -> Result<Option<Value>> {
    entity
        .map(serde_json::to_value)
        .transpose()
        .context("failed to serialize lookup result")
}
