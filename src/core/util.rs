use super::MaintenanceTask;
use std::cmp::Ordering;

/// Task with its position in the input.
pub type TaskWithId<'a> = (usize, &'a MaintenanceTask);

/// Orders tasks by descending urgency. Equal urgencies keep input order.
#[must_use]
pub fn urgency_comparator(first: &TaskWithId, second: &TaskWithId) -> Ordering {
    match second.1.urgency().total_cmp(&first.1.urgency()) {
        Ordering::Equal => first.0.cmp(&second.0),
        order => order,
    }
}

/// Returns the tasks in the order the assigner visits them.
#[must_use]
pub fn prioritize(tasks: &[MaintenanceTask]) -> Vec<TaskWithId<'_>> {
    let mut ordered: Vec<TaskWithId> = tasks.iter().enumerate().collect();
    ordered.sort_unstable_by(urgency_comparator);
    ordered
}
