use anyhow::{bail, Context, Result};
use kea_config_core::{detect_family, read_document, AddressFamily, Dhcp4Parser, Dhcp6Parser};
use kea_config_edit::report::render_summary;
use kea_config_edit::summary::summarize;

use crate::cli::{OutputFormat, ShowArgs};

pub fn run_show(args: ShowArgs) -> Result<()> {
    let document = read_document(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let summary = match detect_family(&document) {
        Some(AddressFamily::Dhcp4) => summarize(
            &Dhcp4Parser::new(document)
                .with_context(|| format!("failed to load {}", args.file.display()))?,
        ),
        Some(AddressFamily::Dhcp6) => summarize(
            &Dhcp6Parser::new(document)
                .with_context(|| format!("failed to load {}", args.file.display()))?,
        ),
        None => bail!(
            "{} has no single Dhcp4 or Dhcp6 section",
            args.file.display()
        ),
    };

    match args.format {
        OutputFormat::Text => println!("{}", render_summary(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
