use colored::Colorize;

use crate::summary::{ConfigSummary, SubnetSummary};

/// Render a configuration summary for terminal output.
pub fn render_summary(summary: &ConfigSummary) -> String {
    let mut out = Vec::new();
    out.push(
        format!(
            "{} subnets={} shared_networks={}",
            summary.family,
            summary.subnet_count(),
            summary.shared_networks.len()
        )
        .cyan()
        .bold()
        .to_string(),
    );

    out.push(format!("global subnets ({})", summary.global_subnets.len()));
    for subnet in &summary.global_subnets {
        out.push(render_subnet(subnet, "  "));
    }

    for network in &summary.shared_networks {
        out.push(format!(
            "shared network {} options={} subnets={}",
            network.name.yellow(),
            network.options,
            network.subnets.len()
        ));
        for subnet in &network.subnets {
            out.push(render_subnet(subnet, "  "));
        }
    }

    out.join("\n")
}

fn render_subnet(subnet: &SubnetSummary, indent: &str) -> String {
    let mut line = format!(
        "{indent}- id={} {} pools={}",
        subnet.id,
        subnet.cidr.green(),
        subnet.pools
    );
    if let Some(pd_pools) = subnet.pd_pools {
        line.push_str(&format!(" pd_pools={pd_pools}"));
    }
    line.push_str(&format!(
        " reservations={} options={}",
        subnet.reservations, subnet.options
    ));
    line
}
