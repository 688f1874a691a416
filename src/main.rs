use clap::{Args, Parser};
use maintenance_scheduling::algo::FirstFit;
use maintenance_scheduling::core::{Config, RuleTable};
use maintenance_scheduling::data::{self, CrewLevel, Scenario};
use maintenance_scheduling::run_reader;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::num::NonZero;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Scheduling parameters shared by all commands.
#[derive(Debug, Args)]
struct ConfigArgs {
    /// Number of time slots.
    #[clap(long, default_value = "14")]
    horizon: NonZero<usize>,
    /// Number of vessels.
    #[clap(long, default_value = "5")]
    vessels: NonZero<usize>,
    /// Capacity of a vessel in a single slot.
    #[clap(long, default_value = "20")]
    vessel_capacity: NonZero<u32>,
    /// Crew available in a single slot.
    #[clap(long, default_value = "15")]
    crew_capacity: NonZero<u32>,
    /// Cost of using a vessel in a slot.
    #[clap(long, default_value = "2000")]
    vessel_cost: f64,
    /// Cost of an asset failure at probability 1.
    #[clap(long, default_value = "1000")]
    downtime_scale: f64,
    /// JSON file with the rules of every component category.
    #[clap(short, long)]
    rules: Option<PathBuf>,
}

impl ConfigArgs {
    fn config(&self) -> Config {
        Config {
            horizon: self.horizon.get(),
            vessels: self.vessels.get(),
            vessel_slot_capacity: self.vessel_capacity.get(),
            crew_capacity: self.crew_capacity.get(),
            vessel_unit_cost: self.vessel_cost,
            downtime_scale: self.downtime_scale,
        }
    }

    fn rules(&self) -> anyhow::Result<RuleTable> {
        self.rules.as_ref().map_or_else(
            || Ok(RuleTable::default()),
            |path| data::read_rules(BufReader::new(File::open(path)?)),
        )
    }
}

/// Application scheduling maintenance of wind turbines.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Schedule the alerts of a CSV file and write the schedule to stdout.
    Run {
        /// The alerts file.
        alerts: PathBuf,
        #[clap(flatten)]
        config: ConfigArgs,
    },
    /// Schedule the same alerts under several crew capacities.
    Experiment {
        /// The alerts file.
        alerts: PathBuf,
        /// Scenarios as name:crew_capacity. Defaults to low_crew:10, baseline:15 and high_crew:25.
        #[clap(short, long, value_delimiter = ',')]
        scenario: Vec<CrewLevel>,
        /// Directory for the schedules and the summary. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "results")]
        output: PathBuf,
        #[clap(flatten)]
        config: ConfigArgs,
    },
    /// Generate alerts for testing.
    Gen {
        /// The number of alerts.
        alerts: NonZero<usize>,
        /// Seed of the random generator.
        #[clap(short, long, default_value = "0")]
        seed: u64,
        /// JSON file with the component categories to draw from.
        #[clap(short, long)]
        rules: Option<PathBuf>,
        /// Path to output the generated alerts.
        #[clap(short, long, default_value = "data/alerts.csv")]
        output: PathBuf,
    },
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.try_exists()? => {
            Ok(std::fs::create_dir_all(parent)?)
        }
        _ => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    enable_tracing();

    match Application::parse() {
        Application::Run { alerts, config } => {
            let reader = BufReader::new(File::open(&alerts)?);
            let (total_cost, unscheduled) = run_reader(
                &mut FirstFit,
                config.config(),
                config.rules()?,
                reader,
                std::io::stdout().lock(),
            )?;
            tracing::info!("Total cost {total_cost:.2}, {unscheduled} tasks unscheduled");
            Ok(())
        }
        Application::Experiment {
            alerts,
            scenario,
            output,
            config,
        } => {
            let base = config.config();
            let rules = config.rules()?;
            let tasks = data::read_tasks(BufReader::new(File::open(&alerts)?))?;

            let scenarios = if scenario.is_empty() {
                Scenario::crew_levels(base)
            } else {
                scenario.iter().map(|level| level.scenario(base)).collect()
            };

            let report = data::experiment::<FirstFit>(&scenarios, &rules, &tasks)?;

            if !output.try_exists()? {
                std::fs::create_dir_all(&output)?;
            }
            for entry in report.entries() {
                let path = output.join(format!("schedule_{}.csv", entry.scenario));
                data::write_records(BufWriter::new(File::create(&path)?), &entry.records)?;
                tracing::info!("Schedule saved: {} ({} tasks)", path.display(), entry.num_tasks);
            }
            report.write_summary(BufWriter::new(File::create(output.join("summary.csv"))?))?;

            print!("{report}");
            Ok(())
        }
        Application::Gen {
            alerts,
            seed,
            rules,
            output,
        } => {
            let rules = rules.map_or_else(
                || Ok(RuleTable::default()),
                |path| data::read_rules(BufReader::new(File::open(path)?)),
            )?;
            let generated = data::generate(alerts.get(), seed, &rules)?;

            create_parent(&output)?;
            data::write_alerts(BufWriter::new(File::create(&output)?), &generated)?;
            tracing::info!("{} alerts written to {}", generated.len(), output.display());
            Ok(())
        }
    }
}
