mod cost;
mod ledger;
mod problem;
mod schedule;
mod util;

pub use cost::*;
pub use ledger::*;
pub use problem::*;
pub use schedule::*;
pub use util::*;

/// Schedules the tasks of an instance.
pub trait Scheduler {
    /// Schedules the tasks of the given instance.
    fn schedule<'a>(&mut self, instance: &'a Instance) -> Schedule<'a>;

    /// Returns the name of the scheduler.
    fn name(&self) -> &str;
}
