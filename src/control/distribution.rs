//! Distribution of the EVCS budget across clusters.

use serde::Serialize;

/// Current draw of one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDemand {
    pub id: String,
    pub active_power_w: i32,
}

impl ClusterDemand {
    pub fn new(id: impl Into<String>, active_power_w: i32) -> Self {
        Self {
            id: id.into(),
            active_power_w,
        }
    }
}

/// Power a cluster may distribute among its stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAllowance {
    pub id: String,
    pub allowed_power_w: i32,
}

/// Splits `budget` across `clusters`, preserving their order.
///
/// A budget below 1 (unlimited sentinel or zero) is handed to every cluster
/// unchanged. Otherwise current demand is served first, in order, from the
/// shared pool; what is left is spread evenly over all clusters. Watts left
/// over by the integer division go one each to the first clusters, so the
/// allowances always add up to the budget.
pub fn distribute(budget: i32, clusters: &[ClusterDemand]) -> Vec<ClusterAllowance> {
    if budget < 1 || clusters.is_empty() {
        return clusters
            .iter()
            .map(|c| ClusterAllowance {
                id: c.id.clone(),
                allowed_power_w: budget,
            })
            .collect();
    }

    let mut remaining = budget;
    let mut allowances: Vec<ClusterAllowance> = clusters
        .iter()
        .map(|c| {
            let granted = c.active_power_w.clamp(0, remaining);
            remaining -= granted;
            ClusterAllowance {
                id: c.id.clone(),
                allowed_power_w: granted,
            }
        })
        .collect();

    if remaining > 0 {
        // cluster count fits i32 for any budget that leaves a remainder to split
        let n = i32::try_from(allowances.len()).unwrap_or(i32::MAX);
        let share = remaining / n;
        let mut leftover = remaining % n;
        for allowance in &mut allowances {
            allowance.allowed_power_w += share;
            if leftover > 0 {
                allowance.allowed_power_w += 1;
                leftover -= 1;
            }
        }
    }

    allowances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watts(allowances: &[ClusterAllowance]) -> Vec<i32> {
        allowances.iter().map(|a| a.allowed_power_w).collect()
    }

    #[test]
    fn test_demand_served_in_order() {
        let clusters = [ClusterDemand::new("a", 12_000), ClusterDemand::new("b", 11_000)];
        assert_eq!(watts(&distribute(18_120, &clusters)), vec![12_000, 6_120]);
    }

    #[test]
    fn test_idle_clusters_split_evenly() {
        let clusters = [ClusterDemand::new("a", 0), ClusterDemand::new("b", 0)];
        assert_eq!(watts(&distribute(18_120, &clusters)), vec![9_060, 9_060]);
    }

    #[test]
    fn test_single_cluster_gets_everything() {
        let clusters = [ClusterDemand::new("a", 0)];
        assert_eq!(watts(&distribute(10_560, &clusters)), vec![10_560]);
    }

    #[test]
    fn test_remainder_after_demand_is_shared() {
        let clusters = [ClusterDemand::new("a", 1_000), ClusterDemand::new("b", 0)];
        assert_eq!(watts(&distribute(5_000, &clusters)), vec![3_000, 2_000]);
    }

    #[test]
    fn test_division_leftover_goes_to_first_clusters() {
        let clusters = [
            ClusterDemand::new("a", 0),
            ClusterDemand::new("b", 0),
            ClusterDemand::new("c", 0),
        ];
        let allowances = distribute(10_001, &clusters);
        assert_eq!(watts(&allowances), vec![3_334, 3_334, 3_333]);
        assert_eq!(allowances.iter().map(|a| a.allowed_power_w).sum::<i32>(), 10_001);
    }

    #[test]
    fn test_sentinels_propagate() {
        let clusters = [ClusterDemand::new("a", 5_000), ClusterDemand::new("b", 0)];
        assert_eq!(watts(&distribute(-1, &clusters)), vec![-1, -1]);
        assert_eq!(watts(&distribute(0, &clusters)), vec![0, 0]);
    }

    #[test]
    fn test_negative_demand_counts_as_idle() {
        let clusters = [ClusterDemand::new("a", -500), ClusterDemand::new("b", 2_000)];
        assert_eq!(watts(&distribute(3_000, &clusters)), vec![500, 2_500]);
    }

    #[test]
    fn test_order_and_ids_preserved() {
        let clusters = [ClusterDemand::new("z", 0), ClusterDemand::new("a", 0)];
        let ids: Vec<String> = distribute(100, &clusters).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }
}
