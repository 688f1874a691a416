use super::{CategoryRule, Config};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Kinds of pooled resources tracked per slot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Resource {
    /// Labour shared by every vessel working in a slot.
    Crew,
    /// Working time of a single vessel in a slot.
    Vessel,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crew => f.write_str("crew"),
            Self::Vessel => f.write_str("vessel"),
        }
    }
}

/// Errors raised when the ledger is used outside of its contract.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum LedgerError {
    #[error("cell ({slot}, {lane}) is outside of the {resource} pool")]
    OutOfRange {
        resource: Resource,
        slot: usize,
        lane: usize,
    },
    #[error("{resource} cell ({slot}, {lane}) has {remaining} left but {amount} was requested")]
    Overdraw {
        resource: Resource,
        slot: usize,
        lane: usize,
        remaining: u32,
        amount: u32,
    },
}

/// Capacity of one resource over the horizon.
/// Every slot has a fixed number of lanes, each starting at the same capacity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    resource: Resource,
    lanes: usize,
    capacity: u32,
    remaining: Vec<u32>,
}

impl Pool {
    /// Creates a pool with every cell at full capacity.
    #[must_use]
    pub fn new(resource: Resource, slots: usize, lanes: usize, capacity: u32) -> Self {
        Self {
            resource,
            lanes,
            capacity,
            remaining: vec![capacity; slots * lanes],
        }
    }

    #[must_use]
    pub const fn resource(&self) -> Resource {
        self.resource
    }

    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    #[must_use]
    pub fn slots(&self) -> usize {
        self.remaining.len().checked_div(self.lanes).unwrap_or(0)
    }

    fn index(&self, slot: usize, lane: usize) -> Option<usize> {
        (lane < self.lanes && slot < self.slots()).then(|| slot * self.lanes + lane)
    }

    /// Returns the remaining capacity of a cell.
    #[must_use]
    pub fn remaining(&self, slot: usize, lane: usize) -> Option<u32> {
        self.index(slot, lane).map(|index| self.remaining[index])
    }

    /// Returns whether `amount` fits into the cell.
    #[must_use]
    pub fn fits(&self, slot: usize, lane: usize, amount: u32) -> bool {
        self.remaining(slot, lane)
            .is_some_and(|remaining| remaining >= amount)
    }

    /// Returns whether any lane of the slot can take `amount`.
    #[must_use]
    pub fn any_fits(&self, slot: usize, amount: u32) -> bool {
        (0..self.lanes).any(|lane| self.fits(slot, lane, amount))
    }

    /// Takes `amount` from a cell.
    ///
    /// # Errors
    /// - If the cell does not exist.
    /// - If the cell has less than `amount` left. The pool is not modified.
    pub fn take(&mut self, slot: usize, lane: usize, amount: u32) -> Result<(), LedgerError> {
        let resource = self.resource;
        let index = self.index(slot, lane).ok_or(LedgerError::OutOfRange {
            resource,
            slot,
            lane,
        })?;

        let remaining = self.remaining[index];
        self.remaining[index] = remaining
            .checked_sub(amount)
            .ok_or(LedgerError::Overdraw {
                resource,
                slot,
                lane,
                remaining,
                amount,
            })?;

        Ok(())
    }

    /// Number of cells that have been drawn from at least once.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.remaining
            .iter()
            .filter(|&&remaining| remaining < self.capacity)
            .count()
    }
}

/// Tracks crew and vessel capacity of every slot during one scheduling pass.
/// Cells only ever decrease; there is no undo.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ledger {
    crew: Pool,
    vessels: Pool,
}

impl Ledger {
    /// Creates a ledger with every pool at full capacity.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            crew: Pool::new(Resource::Crew, config.horizon, 1, config.crew_capacity),
            vessels: Pool::new(
                Resource::Vessel,
                config.horizon,
                config.vessels,
                config.vessel_slot_capacity,
            ),
        }
    }

    /// Returns the pool of the given resource.
    #[must_use]
    pub const fn pool(&self, resource: Resource) -> &Pool {
        match resource {
            Resource::Crew => &self.crew,
            Resource::Vessel => &self.vessels,
        }
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.vessels.slots()
    }

    #[must_use]
    pub const fn vessels(&self) -> usize {
        self.vessels.lanes()
    }

    /// Remaining crew in a slot.
    #[must_use]
    pub fn crew_remaining(&self, slot: usize) -> Option<u32> {
        self.crew.remaining(slot, 0)
    }

    /// Remaining capacity of a vessel in a slot.
    #[must_use]
    pub fn vessel_remaining(&self, slot: usize, vessel: usize) -> Option<u32> {
        self.vessels.remaining(slot, vessel)
    }

    /// Returns whether a task with the given rule fits on `vessel` in `slot`.
    #[must_use]
    pub fn can_place(&self, slot: usize, vessel: usize, rule: CategoryRule) -> bool {
        self.vessels.fits(slot, vessel, rule.duration) && self.crew.fits(slot, 0, rule.crew_required)
    }

    /// Returns whether a demand can be placed anywhere in the slot.
    #[must_use]
    pub fn slot_open(&self, slot: usize, rule: CategoryRule) -> bool {
        self.crew.fits(slot, 0, rule.crew_required) && self.vessels.any_fits(slot, rule.duration)
    }

    /// Commits a placement, drawing from both pools.
    ///
    /// # Errors
    /// - If the placement is not feasible. Nothing is drawn in that case.
    pub fn place(&mut self, slot: usize, vessel: usize, rule: CategoryRule) -> Result<(), LedgerError> {
        if !self.vessels.fits(slot, vessel, rule.duration) {
            return self.vessels.take(slot, vessel, rule.duration);
        }
        self.crew.take(slot, 0, rule.crew_required)?;
        self.vessels.take(slot, vessel, rule.duration)
    }

    /// Number of (slot, vessel) cells used by at least one task.
    #[must_use]
    pub fn vessel_cells_used(&self) -> usize {
        self.vessels.touched()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> Config {
        Config {
            horizon: 2,
            vessels: 2,
            vessel_slot_capacity: 10,
            crew_capacity: 3,
            ..Config::default()
        }
    }

    #[test]
    fn new_ledger_is_full() {
        let ledger = Ledger::new(&config());
        assert_eq!(ledger.horizon(), 2);
        assert_eq!(ledger.vessels(), 2);
        assert_eq!(ledger.crew_remaining(1), Some(3));
        assert_eq!(ledger.vessel_remaining(1, 1), Some(10));
        assert_eq!(ledger.vessel_remaining(2, 0), None);
        assert_eq!(ledger.vessel_cells_used(), 0);
    }

    #[test]
    fn place_draws_from_both_pools() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(&config());
        let rule = CategoryRule::new(6, 2);

        assert!(ledger.can_place(0, 1, rule));
        ledger.place(0, 1, rule)?;

        assert_eq!(ledger.vessel_remaining(0, 1), Some(4));
        assert_eq!(ledger.vessel_remaining(0, 0), Some(10));
        assert_eq!(ledger.crew_remaining(0), Some(1));
        assert_eq!(ledger.crew_remaining(1), Some(3));
        assert_eq!(ledger.vessel_cells_used(), 1);

        // Crew is shared, so the other vessel is blocked as well.
        assert!(!ledger.can_place(0, 0, rule));
        assert!(ledger.can_place(1, 0, rule));
        Ok(())
    }

    #[test]
    fn place_fails_loudly_and_keeps_state() {
        let mut ledger = Ledger::new(&config());
        let before = ledger.clone();

        let err = ledger.place(0, 0, CategoryRule::new(11, 1));
        assert_eq!(
            err,
            Err(LedgerError::Overdraw {
                resource: Resource::Vessel,
                slot: 0,
                lane: 0,
                remaining: 10,
                amount: 11,
            })
        );

        let err = ledger.place(0, 0, CategoryRule::new(1, 4));
        assert!(matches!(
            err,
            Err(LedgerError::Overdraw {
                resource: Resource::Crew,
                ..
            })
        ));

        let err = ledger.place(5, 0, CategoryRule::new(1, 1));
        assert!(matches!(err, Err(LedgerError::OutOfRange { slot: 5, .. })));

        assert_eq!(ledger, before);
    }

    #[test]
    fn exact_fit_reaches_zero() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(&config());
        ledger.place(1, 0, CategoryRule::new(10, 3))?;

        assert_eq!(ledger.vessel_remaining(1, 0), Some(0));
        assert_eq!(ledger.crew_remaining(1), Some(0));
        assert!(!ledger.slot_open(1, CategoryRule::new(1, 1)));
        assert!(ledger.slot_open(0, CategoryRule::new(10, 3)));
        Ok(())
    }

    #[test]
    fn touched_counts_cells_once() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(&Config {
            crew_capacity: 10,
            ..config()
        });
        let rule = CategoryRule::new(2, 1);
        ledger.place(0, 0, rule)?;
        ledger.place(0, 0, rule)?;
        ledger.place(1, 1, rule)?;

        assert_eq!(ledger.vessel_cells_used(), 2);
        assert_eq!(ledger.pool(Resource::Crew).touched(), 2);
        Ok(())
    }
}
