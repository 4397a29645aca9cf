use kea_config_core::{Family, Parser, Subnet4, Subnet6, SubnetId, SubnetRecord};
use serde::Serialize;

/// Per-subnet child counts shown by `show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetSummary {
    pub id: SubnetId,
    pub cidr: String,
    pub pools: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pd_pools: Option<usize>,
    pub reservations: usize,
    pub options: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedNetworkSummary {
    pub name: String,
    pub options: usize,
    pub subnets: Vec<SubnetSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub family: &'static str,
    pub global_subnets: Vec<SubnetSummary>,
    pub shared_networks: Vec<SharedNetworkSummary>,
}

impl ConfigSummary {
    pub fn subnet_count(&self) -> usize {
        self.global_subnets.len()
            + self
                .shared_networks
                .iter()
                .map(|network| network.subnets.len())
                .sum::<usize>()
    }
}

/// Subnet types that can describe themselves for a summary.
pub trait SummarizeSubnet {
    fn summarize(&self) -> SubnetSummary;
}

impl SummarizeSubnet for Subnet4 {
    fn summarize(&self) -> SubnetSummary {
        counts(self, None)
    }
}

impl SummarizeSubnet for Subnet6 {
    fn summarize(&self) -> SubnetSummary {
        counts(self, Some(self.pd_pools().len()))
    }
}

/// Build a summary of every subnet and shared network in `parser`.
pub fn summarize<F: Family>(parser: &Parser<F>) -> ConfigSummary
where
    F::Subnet: SummarizeSubnet,
{
    ConfigSummary {
        family: F::DAEMON,
        global_subnets: parser
            .global_subnets()
            .map(SummarizeSubnet::summarize)
            .collect(),
        shared_networks: parser
            .shared_networks()
            .iter()
            .map(|network| SharedNetworkSummary {
                name: network.name().to_string(),
                options: network.option_data().len(),
                subnets: parser
                    .shared_network_subnets(network.name())
                    .map(SummarizeSubnet::summarize)
                    .collect(),
            })
            .collect(),
    }
}

fn counts<S: SubnetRecord>(subnet: &S, pd_pools: Option<usize>) -> SubnetSummary {
    SubnetSummary {
        id: subnet.id(),
        cidr: subnet.cidr().to_string(),
        pools: subnet.pools().len(),
        pd_pools,
        reservations: subnet.reservations().len(),
        options: subnet.option_data().len(),
    }
}

#[cfg(test)]
mod tests {
    use kea_config_core::{Dhcp4Parser, Dhcp6Parser};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{summarize, SubnetSummary};

    #[test]
    fn summary_follows_parser_order() {
        let parser = Dhcp4Parser::new(json!({
            "Dhcp4": {
                "subnet4": [{"id": 2, "subnet": "10.0.2.0/24", "pools": [{"pool": "10.0.2.10-10.0.2.20"}]}],
                "shared-networks": [{
                    "name": "lan",
                    "subnet4": [{"id": 1, "subnet": "10.0.1.0/24", "reservations": [{"ip-address": "10.0.1.5"}]}]
                }]
            }
        }))
        .expect("parse");

        let summary = summarize(&parser);
        assert_eq!(summary.family, "Dhcp4");
        assert_eq!(summary.subnet_count(), 2);
        assert_eq!(
            summary.global_subnets,
            vec![SubnetSummary {
                id: 2,
                cidr: "10.0.2.0/24".to_string(),
                pools: 1,
                pd_pools: None,
                reservations: 0,
                options: 0,
            }]
        );
        assert_eq!(summary.shared_networks[0].subnets[0].reservations, 1);
    }

    #[test]
    fn v6_summary_counts_pd_pools() {
        let parser = Dhcp6Parser::new(json!({
            "Dhcp6": {
                "subnet6": [{
                    "id": 1,
                    "subnet": "2001:db8:1::/64",
                    "pd-pools": [{"prefix": "2001:db8:8000::", "prefix-len": 48, "delegated-len": 56}]
                }]
            }
        }))
        .expect("parse");

        assert_eq!(summarize(&parser).global_subnets[0].pd_pools, Some(1));
    }
}
