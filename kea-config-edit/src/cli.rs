use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kea-config-edit")]
#[command(about = "Inspect and edit Kea DHCP configuration files offline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Summarize subnets and shared networks of one config.
    Show(ShowArgs),
    /// Look up a subnet or reservation and print it as JSON.
    Find(FindArgs),
    /// Apply a TOML edit plan to a config.
    Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Kea configuration file (Dhcp4 or Dhcp6).
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Kea configuration file (Dhcp4 or Dhcp6).
    pub file: PathBuf,
    #[command(flatten)]
    pub query: Query,
}

/// Exactly one lookup per invocation.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Query {
    /// Subnet by id.
    #[arg(long)]
    pub subnet_id: Option<u32>,
    /// Subnet by prefix, e.g. 192.0.2.0/24.
    #[arg(long)]
    pub cidr: Option<String>,
    /// Reservation by reserved address.
    #[arg(long)]
    pub reservation_ip: Option<String>,
    /// Reservation by host identifier, e.g. hw-address=aa:bb:cc:dd:ee:ff.
    #[arg(long, value_name = "TYPE=VALUE")]
    pub identifier: Option<String>,
    /// Subnet holding this start-end pool.
    #[arg(long)]
    pub pool: Option<String>,
    /// Subnet whose routers option is this address.
    #[arg(long)]
    pub gateway: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Kea configuration file (Dhcp4 or Dhcp6).
    pub file: PathBuf,
    /// TOML file with [[edit]] entries.
    #[arg(long)]
    pub plan: PathBuf,
    /// Write the edited config here instead of overwriting FILE.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Print the edited config to stdout and write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
