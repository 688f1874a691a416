use crate::core::{Config, ConfigError, Instance, MaintenanceTask, RuleTable, Scheduler};
use anyhow::anyhow;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::str::FromStr;

/// A named configuration to run the scheduler with.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub config: Config,
}

impl Scenario {
    #[must_use]
    pub const fn new(name: String, config: Config) -> Self {
        Self { name, config }
    }

    /// Low, baseline and high crew capacity on top of the base configuration.
    #[must_use]
    pub fn crew_levels(base: Config) -> Vec<Self> {
        [("low_crew", 10), ("baseline", 15), ("high_crew", 25)]
            .into_iter()
            .map(|(name, crew)| Self::new(name.into(), base.with_crew_capacity(crew)))
            .collect()
    }
}

/// Crew override of a scenario written as `name:crew_capacity`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrewLevel {
    pub name: String,
    pub crew_capacity: u32,
}

impl CrewLevel {
    /// Applies the override to a base configuration.
    #[must_use]
    pub fn scenario(&self, base: Config) -> Scenario {
        Scenario::new(self.name.clone(), base.with_crew_capacity(self.crew_capacity))
    }
}

impl FromStr for CrewLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        let (name, crew) = value
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected name:crew_capacity, got {value}"))?;
        if name.is_empty() {
            return Err(anyhow!("Scenario name is empty"));
        }
        Ok(Self {
            name: name.into(),
            crew_capacity: crew.parse()?,
        })
    }
}

/// Report of running a set of scenarios.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Get the scheduler name.
    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// Get the entries, in scenario order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Writes one summary row per scenario as CSV. The header is written even without entries.
    ///
    /// # Errors
    /// - If writing fails.
    pub fn write_summary(&self, writer: impl std::io::Write) -> anyhow::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(SUMMARY_HEADER)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Columns of the summary CSV, in the field order of `ReportEntry`.
const SUMMARY_HEADER: [&str; 5] = [
    "scenario",
    "crew_capacity",
    "total_cost",
    "num_tasks",
    "unscheduled",
];

/// Summary of a single scenario.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub scenario: String,
    pub crew_capacity: u32,
    pub total_cost: f64,
    pub num_tasks: usize,
    pub unscheduled: usize,
    #[serde(skip)]
    pub records: Vec<super::AssignmentRecord>,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: {} tasks, {} unscheduled, cost {:.2} (crew {})",
            self.scenario, self.num_tasks, self.unscheduled, self.total_cost, self.crew_capacity
        )
    }
}

/// Runs every scenario on the same tasks. Scenarios are independent and run in parallel.
///
/// # Errors
/// - If any scenario has an invalid configuration. No scenario is run in that case.
///
/// # Panics
/// - If a schedule is invalid in debug mode.
pub fn experiment<S>(
    scenarios: &[Scenario],
    rules: &RuleTable,
    tasks: &[MaintenanceTask],
) -> std::result::Result<Report, ConfigError>
where
    S: Scheduler + Default,
{
    for scenario in scenarios {
        scenario.config.validate()?;
        rules.validate(&scenario.config)?;
    }

    let entries = scenarios
        .par_iter()
        .map(|scenario| run_scenario::<S>(scenario, rules, tasks))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Report {
        scheduler: S::default().name().into(),
        entries,
    })
}

#[tracing::instrument(level = "info", skip_all, fields(scenario = %scenario.name))]
fn run_scenario<S>(
    scenario: &Scenario,
    rules: &RuleTable,
    tasks: &[MaintenanceTask],
) -> std::result::Result<ReportEntry, ConfigError>
where
    S: Scheduler + Default,
{
    let instance = Instance::new(scenario.config, rules.clone(), tasks.to_vec())?;
    let schedule = S::default().schedule(&instance);

    debug_assert!(schedule.verify(), "Schedule is invalid: {schedule:?}");

    tracing::info!(
        "{} tasks scheduled, {} unscheduled, total cost {:.2}",
        schedule.assignments().len(),
        schedule.unscheduled_len(),
        schedule.total_cost()
    );

    Ok(ReportEntry {
        scenario: scenario.name.clone(),
        crew_capacity: scenario.config.crew_capacity,
        total_cost: schedule.total_cost(),
        num_tasks: schedule.assignments().len(),
        unscheduled: schedule.unscheduled_len(),
        records: super::records(&schedule),
    })
}
