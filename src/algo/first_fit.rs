use crate::core::{
    prioritize, Assignment, CategoryRule, Instance, Ledger, Schedule, Scheduler, SkipReason,
};

/// Returns the first (slot, vessel) pair, in ascending slot then vessel order, where the rule fits.
fn first_fit(ledger: &Ledger, from: usize, rule: CategoryRule) -> Option<(usize, usize)> {
    let vessels = ledger.vessels();
    (from..ledger.horizon())
        .flat_map(|slot| (0..vessels).map(move |vessel| (slot, vessel)))
        .find(|&(slot, vessel)| ledger.can_place(slot, vessel, rule))
}

/// Greedy single pass over the tasks in priority order.
/// Every task takes the earliest feasible slot and the lowest vessel in it, or is left out.
#[tracing::instrument(level = "debug", name = "First fit", skip_all, fields(tasks = instance.tasks().len()))]
pub(super) fn schedule(instance: &Instance) -> Schedule {
    let config = instance.config();
    let mut ledger = Ledger::new(config);
    let mut schedule = Schedule::new(instance);

    let Some(smallest) = instance.rules().minimum() else {
        unreachable!("Instance always has at least one rule");
    };

    // Slots before the frontier cannot host even the smallest demand.
    let mut frontier = 0;

    for (rank, (id, task)) in prioritize(instance.tasks()).into_iter().enumerate() {
        let Some(rule) = instance.rules().get(task.category()) else {
            tracing::warn!(
                "Task {} of asset {} has unknown category {}",
                id,
                task.asset_id(),
                task.category()
            );
            schedule.skip(id, SkipReason::UnknownCategory);
            continue;
        };

        while frontier < config.horizon && !ledger.slot_open(frontier, smallest) {
            frontier += 1;
        }

        let Some((slot, vessel)) = first_fit(&ledger, frontier, rule) else {
            tracing::debug!("Task {} of asset {} does not fit", id, task.asset_id());
            schedule.skip(id, SkipReason::Exhausted);
            continue;
        };

        if let Err(err) = ledger.place(slot, vessel, rule) {
            unreachable!("Feasible placement was rejected: {err}");
        }

        tracing::trace!(
            "Task {} of asset {} placed at slot {} on vessel {}",
            id,
            task.asset_id(),
            slot,
            vessel
        );
        schedule.assign(Assignment::new(id, rank, task, slot, vessel, config.downtime_scale));
    }

    schedule.close(&ledger);

    tracing::debug!(
        "Scheduled {} tasks, {} left out, total cost {:.2}",
        schedule.assignments().len(),
        schedule.unscheduled_len(),
        schedule.total_cost()
    );

    schedule
}

/// Greedy first-fit scheduler.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstFit;

impl Scheduler for FirstFit {
    fn schedule<'a>(&mut self, instance: &'a Instance) -> Schedule<'a> {
        schedule(instance)
    }

    fn name(&self) -> &'static str {
        "FirstFit"
    }
}
