mod generate;
mod run;

pub use generate::*;
pub use run::*;

use crate::core::{MaintenanceTask, RuleTable, Schedule};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// An alert row as produced by condition monitoring.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Alert {
    pub turbine_id: String,
    pub component: String,
    /// Remaining useful life in days.
    #[serde(rename = "RUL_days", default)]
    pub rul_days: Option<u32>,
    /// Probability of failure within the next 14 days.
    pub p_fail_14d: f64,
}

impl Alert {
    /// Creates a new alert.
    #[must_use]
    pub fn new(turbine_id: String, component: String, rul_days: Option<u32>, p_fail_14d: f64) -> Self {
        Self {
            turbine_id,
            component,
            rul_days,
            p_fail_14d,
        }
    }
}

/// A schedule row consumed by reporting tools.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AssignmentRecord {
    /// Position of the task in the priority order.
    pub task: usize,
    pub turbine_id: String,
    pub component: String,
    pub time: usize,
    pub vessel: usize,
    pub urgency: f64,
    pub downtime_cost: f64,
}

/// Reads alerts from CSV.
///
/// # Errors
/// - If the CSV is malformed or a required column is missing.
pub fn read_alerts(reader: impl Read) -> anyhow::Result<Vec<Alert>> {
    let mut reader = csv::Reader::from_reader(reader);
    let alerts = reader.deserialize::<Alert>().collect::<Result<_, _>>()?;
    Ok(alerts)
}

/// Writes alerts as CSV.
///
/// # Errors
/// - If writing fails.
pub fn write_alerts(writer: impl Write, alerts: &[Alert]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for alert in alerts {
        writer.serialize(alert)?;
    }
    writer.flush()?;
    Ok(())
}

/// Turns alerts into tasks. Alerts without any failure risk are dropped.
/// Alerts with a probability outside of `[0, 1]` are logged and dropped as well.
#[must_use]
pub fn to_tasks(alerts: Vec<Alert>) -> Vec<MaintenanceTask> {
    let mut rejected = 0;
    let tasks: Vec<_> = alerts
        .into_iter()
        .filter(|alert| alert.p_fail_14d > 0.0)
        .filter_map(|alert| {
            let turbine_id = alert.turbine_id.clone();
            MaintenanceTask::new(alert.turbine_id, alert.component, alert.p_fail_14d)
                .inspect_err(|err| {
                    rejected += 1;
                    tracing::warn!("Alert of turbine {turbine_id} dropped: {err}");
                })
                .ok()
        })
        .collect();

    if rejected > 0 {
        tracing::warn!("{rejected} alerts dropped for invalid probability");
    }
    tasks
}

/// Reads schedulable tasks from an alerts CSV.
///
/// # Errors
/// - If the CSV is malformed or a required column is missing.
pub fn read_tasks(reader: impl Read) -> anyhow::Result<Vec<MaintenanceTask>> {
    Ok(to_tasks(read_alerts(reader)?))
}

/// Reads a rule table from JSON.
///
/// # Errors
/// - If the JSON does not describe a rule table.
pub fn read_rules(reader: impl Read) -> anyhow::Result<RuleTable> {
    Ok(serde_json::from_reader(reader)?)
}

/// Converts a schedule into rows in assignment order.
#[must_use]
pub fn records(schedule: &Schedule) -> Vec<AssignmentRecord> {
    schedule
        .assignments()
        .iter()
        .map(|a| AssignmentRecord {
            task: a.rank,
            turbine_id: a.task.asset_id().into(),
            component: a.task.category().to_string(),
            time: a.slot,
            vessel: a.vessel,
            urgency: a.task.urgency(),
            downtime_cost: a.downtime_cost,
        })
        .collect()
}

/// Writes schedule rows as CSV.
///
/// # Errors
/// - If writing fails.
pub fn write_records(writer: impl Write, records: &[AssignmentRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a schedule as CSV.
///
/// # Errors
/// - If writing fails.
pub fn write_schedule(writer: impl Write, schedule: &Schedule) -> anyhow::Result<()> {
    write_records(writer, &records(schedule))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::FirstFit;
    use crate::core::{Config, Instance, Scheduler};
    use std::fs::File;
    use std::io::BufReader;

    #[test]
    fn alerts_are_filtered_by_risk() -> anyhow::Result<()> {
        let csv = "turbine_id,component,RUL_days,p_fail_14d\n\
                   T0001,gearbox,60,0.0\n\
                   T0002,blade,30,0.5\n\
                   T0003,generator,9,0.85\n";
        let tasks = read_tasks(csv.as_bytes())?;

        let ids: Vec<_> = tasks.iter().map(MaintenanceTask::asset_id).collect();
        assert_eq!(ids, vec!["T0002", "T0003"]);
        assert_eq!(tasks[1].category().as_str(), "generator");
        Ok(())
    }

    #[test]
    fn remaining_life_is_optional() -> anyhow::Result<()> {
        let csv = "turbine_id,component,p_fail_14d\nT0001,blade,0.3\n";
        let alerts = read_alerts(csv.as_bytes())?;
        assert_eq!(alerts[0].rul_days, None);
        Ok(())
    }

    #[test]
    fn invalid_probability_drops_only_that_alert() -> anyhow::Result<()> {
        let csv = "turbine_id,component,RUL_days,p_fail_14d\n\
                   T0001,blade,3,1.7\n\
                   T0002,gearbox,20,0.6\n\
                   T0003,blade,1,NaN\n";
        let tasks = read_tasks(csv.as_bytes())?;

        let ids: Vec<_> = tasks.iter().map(MaintenanceTask::asset_id).collect();
        assert_eq!(ids, vec!["T0002"]);
        Ok(())
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "turbine_id,component\nT0001,blade\n";
        assert!(read_tasks(csv.as_bytes()).is_err());
    }

    #[test]
    fn schedule_is_written_in_assignment_order() -> anyhow::Result<()> {
        let tasks = vec![
            MaintenanceTask::new("T0001", "blade", 0.2)?,
            MaintenanceTask::new("T0002", "gearbox", 0.9)?,
        ];
        let instance = Instance::new(Config::default(), RuleTable::default(), tasks)?;
        let schedule = FirstFit.schedule(&instance);

        let mut output = Vec::new();
        write_schedule(&mut output, &schedule)?;
        let output = String::from_utf8(output)?;

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("task,turbine_id,component,time,vessel,urgency,downtime_cost")
        );
        assert_eq!(lines.next(), Some("0,T0002,gearbox,0,0,0.9,900.0"));
        assert_eq!(lines.next(), Some("1,T0001,blade,0,0,0.2,200.0"));
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn task_column_follows_priority_order() -> anyhow::Result<()> {
        let tasks = vec![
            MaintenanceTask::new("T0001", "blade", 0.2)?,
            MaintenanceTask::new("T0002", "blade", 0.9)?,
        ];
        let instance = Instance::new(Config::default(), RuleTable::default(), tasks)?;
        let schedule = FirstFit.schedule(&instance);

        let rows: Vec<_> = records(&schedule)
            .into_iter()
            .map(|record| (record.turbine_id, record.task))
            .collect();
        assert_eq!(rows, vec![("T0002".to_string(), 0), ("T0001".to_string(), 1)]);
        Ok(())
    }

    #[test]
    fn sample_alerts_schedule_cleanly() -> anyhow::Result<()> {
        let tasks = read_tasks(BufReader::new(File::open("samples/alerts.csv")?))?;
        assert_eq!(tasks.len(), 11);

        let instance = Instance::new(Config::default(), RuleTable::default(), tasks)?;
        let schedule = FirstFit.schedule(&instance);
        assert!(schedule.verify());
        assert_eq!(schedule.assignments().len(), 11);
        Ok(())
    }
}
