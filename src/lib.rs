#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::{Read, Write};

pub mod algo;
pub mod core;
pub mod data;

/// Runs the given scheduler on the alerts read from reader and writes the schedule as CSV
/// to writer.
/// Returns the total cost and the number of unscheduled tasks.
///
/// # Errors
/// - If the configuration or the rule table is invalid.
/// - If the alerts could not be read.
/// - If the schedule could not be written.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn run_reader(
    scheduler: &mut dyn core::Scheduler,
    config: core::Config,
    rules: core::RuleTable,
    reader: impl Read,
    writer: impl Write,
) -> Result<(f64, usize)> {
    let tasks = data::read_tasks(reader)?;
    let instance = core::Instance::new(config, rules, tasks)?;
    let schedule = scheduler.schedule(&instance);

    debug_assert!(schedule.verify(), "Schedule is invalid: {schedule:?}");

    data::write_schedule(writer, &schedule)?;

    Ok((schedule.total_cost(), schedule.unscheduled_len()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_reader_writes_schedule() -> Result<()> {
        let alerts = "turbine_id,component,RUL_days,p_fail_14d\n\
                      T0001,blade,10,0.8\n\
                      T0002,rotor,10,0.9\n";
        let config = core::Config {
            horizon: 2,
            vessels: 1,
            vessel_slot_capacity: 10,
            crew_capacity: 3,
            vessel_unit_cost: 100.0,
            downtime_scale: 10.0,
        };

        let mut output = Vec::new();
        let (total, unscheduled) = run_reader(
            &mut algo::FirstFit,
            config,
            core::RuleTable::new().with("blade", core::CategoryRule::new(6, 2)),
            alerts.as_bytes(),
            &mut output,
        )?;

        assert!((total - 108.0).abs() < 1e-9);
        assert_eq!(unscheduled, 1);
        assert_eq!(String::from_utf8(output)?.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn run_reader_rejects_unschedulable_rules() {
        let rules = core::RuleTable::new().with("blade", core::CategoryRule::new(30, 2));
        let result = run_reader(
            &mut algo::FirstFit,
            core::Config::default(),
            rules,
            "turbine_id,component,p_fail_14d\n".as_bytes(),
            std::io::sink(),
        );
        assert!(result.is_err());
    }
}
