use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Configuration errors. Any of them makes the run meaningless, so they are reported
/// before scheduling starts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("horizon must contain at least one slot")]
    EmptyHorizon,
    #[error("at least one vessel is required")]
    NoVessels,
    #[error("vessel slot capacity must be positive")]
    NoVesselCapacity,
    #[error("crew capacity must be positive")]
    NoCrewCapacity,
    #[error("{name} must be a finite non-negative number, got {value}")]
    InvalidCost { name: &'static str, value: f64 },
    #[error("rule table is empty")]
    NoRules,
    #[error("category {0} requires a positive duration and crew")]
    EmptyRule(Category),
    #[error("category {category} needs duration {duration} but a vessel holds {capacity} per slot")]
    DurationExceedsCapacity {
        category: Category,
        duration: u32,
        capacity: u32,
    },
    #[error("category {category} needs crew {crew} but only {capacity} are available per slot")]
    CrewExceedsCapacity {
        category: Category,
        crew: u32,
        capacity: u32,
    },
}

/// Invalid task data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("urgency of asset {asset_id} must lie in [0, 1], got {urgency}")]
    InvalidUrgency { asset_id: String, urgency: f64 },
}

/// Component category of a maintenance task, e.g. `gearbox`.
/// Categories are open-ended; only the rule table decides which are schedulable.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Creates a category from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the category name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Resources a single task of a category consumes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CategoryRule {
    /// Units of vessel capacity taken from one slot.
    pub duration: u32,
    /// Crew members taken from the shared pool of one slot.
    pub crew_required: u32,
}

impl CategoryRule {
    #[must_use]
    pub const fn new(duration: u32, crew_required: u32) -> Self {
        Self {
            duration,
            crew_required,
        }
    }
}

/// Mapping from category to its rule. Passed explicitly to every run so that scenarios
/// may use different tables.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "HashMap<Category, CategoryRule>", into = "HashMap<Category, CategoryRule>")]
pub struct RuleTable {
    rules: HashMap<Category, CategoryRule>,
}

impl RuleTable {
    /// Creates an empty rule table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Adds or replaces the rule of a category.
    #[must_use]
    pub fn with(mut self, category: impl Into<Category>, rule: CategoryRule) -> Self {
        self.rules.insert(category.into(), rule);
        self
    }

    /// Returns the rule of the given category.
    #[must_use]
    pub fn get(&self, category: &Category) -> Option<CategoryRule> {
        self.rules.get(category).copied()
    }

    /// Returns the categories sorted by name.
    #[must_use]
    pub fn categories(&self) -> Vec<&Category> {
        let mut categories: Vec<_> = self.rules.keys().collect();
        categories.sort_unstable();
        categories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the component-wise smallest demand of all rules.
    /// No category can be placed where this demand does not fit.
    #[must_use]
    pub fn minimum(&self) -> Option<CategoryRule> {
        let duration = self.rules.values().map(|rule| rule.duration).min()?;
        let crew_required = self.rules.values().map(|rule| rule.crew_required).min()?;
        Some(CategoryRule::new(duration, crew_required))
    }

    /// Checks that every category can be placed into an empty slot.
    ///
    /// # Errors
    /// - If the table is empty.
    /// - If a rule has zero duration or crew.
    /// - If a rule exceeds the per-slot vessel or crew capacity.
    pub fn validate(&self, config: &Config) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        for category in self.categories() {
            let rule = self.rules[category];
            if rule.duration == 0 || rule.crew_required == 0 {
                return Err(ConfigError::EmptyRule(category.clone()));
            }
            if rule.duration > config.vessel_slot_capacity {
                return Err(ConfigError::DurationExceedsCapacity {
                    category: category.clone(),
                    duration: rule.duration,
                    capacity: config.vessel_slot_capacity,
                });
            }
            if rule.crew_required > config.crew_capacity {
                return Err(ConfigError::CrewExceedsCapacity {
                    category: category.clone(),
                    crew: rule.crew_required,
                    capacity: config.crew_capacity,
                });
            }
        }

        Ok(())
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
            .with("gearbox", CategoryRule::new(12, 3))
            .with("generator", CategoryRule::new(8, 2))
            .with("blade", CategoryRule::new(6, 2))
    }
}

impl From<HashMap<Category, CategoryRule>> for RuleTable {
    fn from(rules: HashMap<Category, CategoryRule>) -> Self {
        Self { rules }
    }
}

impl From<RuleTable> for HashMap<Category, CategoryRule> {
    fn from(table: RuleTable) -> Self {
        table.rules
    }
}

/// A failure-risk alert on an asset that needs a maintenance visit.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MaintenanceTask {
    asset_id: String,
    category: Category,
    urgency: f64,
}

impl MaintenanceTask {
    /// Creates a new task.
    ///
    /// # Errors
    /// - If the urgency is not a number in `[0, 1]`.
    pub fn new(
        asset_id: impl Into<String>,
        category: impl Into<Category>,
        urgency: f64,
    ) -> Result<Self, TaskError> {
        let asset_id = asset_id.into();
        if !(0.0..=1.0).contains(&urgency) {
            return Err(TaskError::InvalidUrgency { asset_id, urgency });
        }
        let category = category.into();
        Ok(Self {
            asset_id,
            category,
            urgency,
        })
    }

    #[must_use]
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub const fn urgency(&self) -> f64 {
        self.urgency
    }

    /// Cost of the downtime risk this task represents.
    #[must_use]
    pub fn downtime_cost(&self, scale: f64) -> f64 {
        self.urgency * scale
    }
}

/// Parameters of one scheduling run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Number of time slots.
    pub horizon: usize,
    /// Number of vessels.
    pub vessels: usize,
    /// Capacity of every vessel in every slot.
    pub vessel_slot_capacity: u32,
    /// Crew shared by all vessels in a slot.
    pub crew_capacity: u32,
    /// Flat cost of using a vessel in a slot.
    pub vessel_unit_cost: f64,
    /// Multiplier turning urgency into downtime cost.
    pub downtime_scale: f64,
}

impl Config {
    /// Returns a copy of the config with a different crew capacity.
    #[must_use]
    pub const fn with_crew_capacity(mut self, crew_capacity: u32) -> Self {
        self.crew_capacity = crew_capacity;
        self
    }

    /// Checks that the config describes a non-empty resource space and sane costs.
    ///
    /// # Errors
    /// - If any dimension or capacity is zero.
    /// - If a cost parameter is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 {
            return Err(ConfigError::EmptyHorizon);
        }
        if self.vessels == 0 {
            return Err(ConfigError::NoVessels);
        }
        if self.vessel_slot_capacity == 0 {
            return Err(ConfigError::NoVesselCapacity);
        }
        if self.crew_capacity == 0 {
            return Err(ConfigError::NoCrewCapacity);
        }

        let costs = [
            ("vessel unit cost", self.vessel_unit_cost),
            ("downtime scale", self.downtime_scale),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCost { name, value });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            horizon: 14,
            vessels: 5,
            vessel_slot_capacity: 20,
            crew_capacity: 15,
            vessel_unit_cost: 2000.0,
            downtime_scale: 1000.0,
        }
    }
}

/// An instance of the maintenance scheduling problem.
/// It can only be created from a valid configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    config: Config,
    rules: RuleTable,
    tasks: Vec<MaintenanceTask>,
}

impl Instance {
    /// Creates a new instance.
    ///
    /// # Errors
    /// - If the configuration or the rule table is invalid.
    pub fn new(
        config: Config,
        rules: RuleTable,
        tasks: Vec<MaintenanceTask>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        rules.validate(&config)?;
        Ok(Self {
            config,
            rules,
            tasks,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[must_use]
    pub fn tasks(&self) -> &[MaintenanceTask] {
        &self.tasks
    }
}
