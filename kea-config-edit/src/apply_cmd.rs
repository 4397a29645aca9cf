use std::io::Write;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use kea_config_core::{
    detect_family, read_document, write_document, write_document_file, AddressFamily,
    Dhcp4, Dhcp6, Family, Parser,
};
use kea_config_edit::plan::{apply_plan, load_plan, Plan, PlanTarget};
use serde_json::Value;
use tracing::info;

use crate::cli::ApplyArgs;

pub fn run_apply(args: ApplyArgs) -> Result<()> {
    let document = read_document(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let plan = load_plan(&args.plan)?;

    let (edited, applied) = match detect_family(&document) {
        Some(AddressFamily::Dhcp4) => edit_document::<Dhcp4>(document, plan)?,
        Some(AddressFamily::Dhcp6) => edit_document::<Dhcp6>(document, plan)?,
        None => bail!(
            "{} has no single Dhcp4 or Dhcp6 section",
            args.file.display()
        ),
    };

    if args.dry_run {
        let bytes = write_document(&edited)?;
        std::io::stdout()
            .write_all(&bytes)
            .context("failed to write to stdout")?;
        info!(applied, "dry run, nothing written");
        return Ok(());
    }

    let out_path = args.output.as_ref().unwrap_or(&args.file);
    write_document_file(&edited, out_path)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!(applied, path = %out_path.display(), "wrote edited configuration");
    println!(
        "{}",
        format!("applied {applied} edits, wrote {}", out_path.display()).green()
    );
    Ok(())
}

fn edit_document<F: Family>(document: Value, plan: Plan) -> Result<(Value, usize)>
where
    Parser<F>: PlanTarget,
{
    let mut parser = Parser::<F>::new(document).context("failed to load configuration")?;
    let applied = apply_plan(&mut parser, plan)?;
    let edited = parser
        .to_document()
        .context("failed to serialize edited configuration")?;
    Ok((edited, applied))
}
