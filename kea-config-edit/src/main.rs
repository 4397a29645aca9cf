use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod apply_cmd;
mod cli;
mod find_cmd;
mod show_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    logging_init();
    let cli = Cli::parse();

    match cli.command {
        Command::Show(args) => show_cmd::run_show(args),
        Command::Find(args) => find_cmd::run_find(args),
        Command::Apply(args) => apply_cmd::run_apply(args),
    }
}

fn logging_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kea_config_edit=info,kea_config_core=info".into()),
        )
        .init();
}
