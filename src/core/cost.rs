use super::{Assignment, Config, Ledger};
use serde::{Deserialize, Serialize};

/// Cost of a schedule.
///
/// Downtime is charged per assigned task. Vessel usage is a flat charge per (slot, vessel)
/// cell that was used at all, no matter how many tasks share it.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Cost {
    pub downtime: f64,
    pub vessel_usage: f64,
}

impl Cost {
    /// Accounts the cost of the assignments and the final ledger.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn account(assignments: &[Assignment], ledger: &Ledger, config: &Config) -> Self {
        let downtime = assignments.iter().map(|a| a.downtime_cost).sum();
        let vessel_usage = config.vessel_unit_cost * ledger.vessel_cells_used() as f64;
        Self {
            downtime,
            vessel_usage,
        }
    }

    /// Total cost.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.downtime + self.vessel_usage
    }
}
