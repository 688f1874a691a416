use super::Alert;
use crate::core::{ConfigError, RuleTable};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Remaining useful life, in days, at which the failure probability reaches zero.
pub const MAX_RUL_DAYS: u32 = 60;

/// Shortest remaining useful life an alert can report.
pub const MIN_RUL_DAYS: u32 = 5;

/// Failure probability on a linear P-F curve, rounded to two decimals.
#[must_use]
pub fn ramp_probability(rul_days: u32) -> f64 {
    let probability = (1.0 - f64::from(rul_days) / f64::from(MAX_RUL_DAYS)).max(0.0);
    (probability * 100.0).round() / 100.0
}

/// Generates `count` alerts for the categories of the rule table.
/// The same seed always produces the same alerts.
///
/// # Errors
/// - If the rule table has no categories to draw from.
pub fn generate(count: usize, seed: u64, rules: &RuleTable) -> Result<Vec<Alert>, ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::NoRules);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let categories = rules.categories();

    let alerts = (1..=count)
        .filter_map(|i| -> Option<Alert> {
            let component = categories.choose(&mut rng)?.to_string();
            let rul_days = rng.gen_range(MIN_RUL_DAYS..=MAX_RUL_DAYS);
            let alert = Alert::new(
                format!("T{i:04}"),
                component,
                Some(rul_days),
                ramp_probability(rul_days),
            );
            Some(alert)
        })
        .collect();
    Ok(alerts)
}
