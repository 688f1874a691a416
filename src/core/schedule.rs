use super::{Cost, Instance, Ledger, MaintenanceTask};
use ahash::{HashSet, HashSetExt};

/// A task placed on a vessel in a slot.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment<'a> {
    /// Position of the task in the instance.
    pub task_id: usize,
    /// Position of the task in the priority order.
    pub rank: usize,
    pub task: &'a MaintenanceTask,
    pub slot: usize,
    pub vessel: usize,
    /// Downtime cost charged for the task.
    pub downtime_cost: f64,
}

impl<'a> Assignment<'a> {
    /// Creates an assignment, charging the task's downtime with the given scale.
    #[must_use]
    pub fn new(
        task_id: usize,
        rank: usize,
        task: &'a MaintenanceTask,
        slot: usize,
        vessel: usize,
        downtime_scale: f64,
    ) -> Self {
        Self {
            task_id,
            rank,
            task,
            slot,
            vessel,
            downtime_cost: task.downtime_cost(downtime_scale),
        }
    }
}

/// Why a task was left out of the schedule.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SkipReason {
    /// No (slot, vessel) pair had enough capacity left.
    Exhausted,
    /// The rule table has no entry for the task's category.
    UnknownCategory,
}

/// A task that could not be placed.
#[derive(Clone, Debug, PartialEq)]
pub struct Unscheduled<'a> {
    pub task_id: usize,
    pub task: &'a MaintenanceTask,
    pub reason: SkipReason,
}

/// Result of one scheduling pass.
/// Assignments are kept in the order they were made.
#[derive(Clone, Debug)]
pub struct Schedule<'a> {
    instance: &'a Instance,
    assignments: Vec<Assignment<'a>>,
    unscheduled: Vec<Unscheduled<'a>>,
    cost: Cost,
}

impl<'a> Schedule<'a> {
    /// Creates an empty schedule.
    #[must_use]
    pub const fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            assignments: Vec::new(),
            unscheduled: Vec::new(),
            cost: Cost {
                downtime: 0.0,
                vessel_usage: 0.0,
            },
        }
    }

    /// Records a placed task.
    pub fn assign(&mut self, assignment: Assignment<'a>) {
        self.assignments.push(assignment);
    }

    /// Records a task that was left out. Ids outside of the instance are ignored.
    pub(crate) fn skip(&mut self, task_id: usize, reason: SkipReason) {
        let Some(task) = self.instance.tasks().get(task_id) else {
            return;
        };
        self.unscheduled.push(Unscheduled {
            task_id,
            task,
            reason,
        });
    }

    /// Accounts the cost using the final state of the ledger.
    pub fn close(&mut self, ledger: &Ledger) {
        self.cost = Cost::account(&self.assignments, ledger, self.instance.config());
    }

    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment<'a>] {
        &self.assignments
    }

    #[must_use]
    pub fn unscheduled(&self) -> &[Unscheduled<'a>] {
        &self.unscheduled
    }

    /// Number of tasks that were left out for any reason.
    #[must_use]
    pub fn unscheduled_len(&self) -> usize {
        self.unscheduled.len()
    }

    #[must_use]
    pub const fn cost(&self) -> Cost {
        self.cost
    }

    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.cost.total()
    }

    /// Replays the assignments on a fresh ledger and checks that
    /// - every placement respects both pools,
    /// - every task is either assigned or unscheduled, exactly once,
    /// - the cost matches the replayed ledger.
    #[must_use]
    pub fn verify(&self) -> bool {
        let instance = self.instance;
        let mut ledger = Ledger::new(instance.config());

        for assignment in &self.assignments {
            let Some(rule) = instance.rules().get(assignment.task.category()) else {
                return false;
            };
            if ledger.place(assignment.slot, assignment.vessel, rule).is_err() {
                return false;
            }
        }

        let mut seen = HashSet::with_capacity(instance.tasks().len());
        let ids = self.assignments.iter().map(|a| a.task_id);
        let ids = ids.chain(self.unscheduled.iter().map(|u| u.task_id));
        for id in ids {
            if id >= instance.tasks().len() || !seen.insert(id) {
                return false;
            }
        }
        if seen.len() != instance.tasks().len() {
            return false;
        }

        let cost = Cost::account(&self.assignments, &ledger, instance.config());
        cost == self.cost
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Config, RuleTable};

    fn instance() -> anyhow::Result<Instance> {
        let tasks = vec![
            MaintenanceTask::new("T0001", "blade", 0.5)?,
            MaintenanceTask::new("T0002", "gearbox", 0.4)?,
        ];
        Ok(Instance::new(Config::default(), RuleTable::default(), tasks)?)
    }

    #[test]
    fn verify_accepts_consistent_schedule() -> anyhow::Result<()> {
        let instance = instance()?;
        let mut ledger = Ledger::new(instance.config());
        let mut schedule = Schedule::new(&instance);

        let task = &instance.tasks()[0];
        let rule = instance.rules().get(task.category()).ok_or_else(|| anyhow::anyhow!("rule"))?;
        ledger.place(0, 0, rule)?;
        schedule.assign(Assignment::new(0, 0, task, 0, 0, 1000.0));
        schedule.skip(1, SkipReason::Exhausted);
        schedule.close(&ledger);

        assert!(schedule.verify());
        assert_eq!(schedule.unscheduled_len(), 1);
        assert!((schedule.total_cost() - 2500.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn verify_rejects_missing_task() -> anyhow::Result<()> {
        let instance = instance()?;
        let mut schedule = Schedule::new(&instance);
        schedule.skip(0, SkipReason::Exhausted);
        schedule.close(&Ledger::new(instance.config()));
        assert!(!schedule.verify());
        Ok(())
    }

    #[test]
    fn verify_rejects_overbooked_cell() -> anyhow::Result<()> {
        let instance = instance()?;
        let mut schedule = Schedule::new(&instance);
        let tasks = instance.tasks();

        // 6 + 12 fits into 20, but twice the gearbox would not.
        schedule.assign(Assignment::new(0, 0, &tasks[0], 0, 0, 1000.0));
        schedule.assign(Assignment::new(1, 1, &tasks[1], 0, 0, 1000.0));
        schedule.assign(Assignment::new(1, 1, &tasks[1], 0, 0, 1000.0));
        assert!(!schedule.verify());
        Ok(())
    }

    #[test]
    fn skipping_unknown_id_is_ignored() -> anyhow::Result<()> {
        let instance = instance()?;
        let mut schedule = Schedule::new(&instance);
        schedule.skip(2, SkipReason::Exhausted);
        schedule.skip(usize::MAX, SkipReason::UnknownCategory);

        assert_eq!(schedule.unscheduled_len(), 0);
        schedule.skip(0, SkipReason::Exhausted);
        schedule.skip(1, SkipReason::Exhausted);
        assert!(schedule.verify());
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_cost() -> anyhow::Result<()> {
        let instance = instance()?;
        let mut schedule = Schedule::new(&instance);
        schedule.skip(0, SkipReason::Exhausted);
        schedule.skip(1, SkipReason::Exhausted);
        assert!(schedule.verify());

        let mut ledger = Ledger::new(instance.config());
        ledger.place(3, 2, crate::core::CategoryRule::new(1, 1))?;
        schedule.close(&ledger);
        assert!(!schedule.verify());
        Ok(())
    }
}
