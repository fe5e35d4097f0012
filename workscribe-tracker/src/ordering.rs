//! Sparse integer ordering of siblings
//!
//! Siblings (tasks in a status column, pages under a parent) carry integer
//! positions spaced `gap` apart. Inserting between two neighbours takes the
//! integer midpoint; when the neighbours are closer than `min_gap` the whole
//! sibling set is respaced to multiples of `gap` first. Respacing keeps the
//! relative order and only changes absolute values.
//!
//! Everything here is pure: callers load the sibling positions inside a write
//! transaction, ask for a [`Placement`], then persist the result.

use crate::error::{Result, TrackerError};
use workscribe_config::OrderingConfig;

/// Largest position an item may hold. Leaves headroom so appending after the
/// last sibling never overflows.
pub const MAX_POSITION: i64 = i64::MAX / 2;

/// Where an item lands, plus any sibling rewrites needed to make room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<K> {
    /// Position for the placed item
    pub position: i64,
    /// New `(key, position)` values for siblings; empty unless rebalanced
    pub rebalanced: Vec<(K, i64)>,
}

impl<K> Placement<K> {
    fn at(position: i64) -> Self {
        Self {
            position,
            rebalanced: Vec::new(),
        }
    }

    pub fn was_rebalanced(&self) -> bool {
        !self.rebalanced.is_empty()
    }
}

/// Gap parameters for computing positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingRules {
    pub gap: i64,
    pub min_gap: i64,
}

impl Default for OrderingRules {
    fn default() -> Self {
        Self::from(OrderingConfig::default())
    }
}

impl From<OrderingConfig> for OrderingRules {
    fn from(config: OrderingConfig) -> Self {
        Self {
            gap: config.gap,
            min_gap: config.min_gap,
        }
    }
}

impl OrderingRules {
    /// Placement for a new item appended after `siblings` (sorted ascending).
    ///
    /// Respaces the siblings when `last + gap` would pass [`MAX_POSITION`].
    pub fn append<K: Clone>(&self, siblings: &[(K, i64)]) -> Placement<K> {
        let last = match siblings.last() {
            Some((_, last)) => *last,
            None => return Placement::at(self.gap),
        };
        match last.checked_add(self.gap).filter(|p| *p <= MAX_POSITION) {
            Some(position) => Placement::at(position),
            None => {
                let rebalanced = self.rebalance(siblings);
                let position = (rebalanced.len() as i64 + 1) * self.gap;
                Placement {
                    position,
                    rebalanced,
                }
            }
        }
    }

    /// Position for an item inserted at `slot` among `siblings`.
    ///
    /// `siblings` must be sorted ascending by position and must not contain
    /// the item being placed. `slot == siblings.len()` means "at the end".
    pub fn place<K: Clone>(&self, siblings: &[(K, i64)], slot: usize) -> Result<Placement<K>> {
        if slot > siblings.len() {
            return Err(TrackerError::invalid_argument(
                "slot",
                format!("slot {} is past the end of {} siblings", slot, siblings.len()),
            ));
        }

        if siblings.is_empty() {
            return Ok(Placement::at(self.gap));
        }
        if slot == siblings.len() {
            return Ok(self.append(siblings));
        }

        let next = siblings[slot].1;
        let prev = if slot == 0 {
            let below = next - self.gap;
            if below > 0 {
                return Ok(Placement::at(below));
            }
            0
        } else {
            siblings[slot - 1].1
        };

        if next - prev >= self.min_gap {
            return Ok(Placement::at(midpoint(prev, next)));
        }

        let rebalanced = self.rebalance(siblings);
        let next = rebalanced[slot].1;
        let prev = if slot == 0 { 0 } else { rebalanced[slot - 1].1 };
        Ok(Placement {
            position: midpoint(prev, next),
            rebalanced,
        })
    }

    /// Respace `siblings` to `gap, 2*gap, ...` preserving their order
    pub fn rebalance<K: Clone>(&self, siblings: &[(K, i64)]) -> Vec<(K, i64)> {
        siblings
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), (i as i64 + 1) * self.gap))
            .collect()
    }
}

fn midpoint(prev: i64, next: i64) -> i64 {
    prev + (next - prev) / 2
}

/// Check a batch reorder request: non-empty, unique keys, unique positions
/// within `1..=MAX_POSITION`
pub fn validate_batch<K: Eq + std::hash::Hash + std::fmt::Display>(
    items: &[(K, i64)],
) -> Result<()> {
    use std::collections::HashSet;

    if items.is_empty() {
        return Err(TrackerError::invalid_argument(
            "items",
            "reorder requires at least one item",
        ));
    }

    let mut keys = HashSet::new();
    let mut positions = HashSet::new();
    for (key, position) in items {
        if !(1..=MAX_POSITION).contains(position) {
            return Err(TrackerError::invalid_argument(
                "items",
                format!(
                    "position {} for {} is outside 1..={}",
                    position, key, MAX_POSITION
                ),
            ));
        }
        if !keys.insert(key) {
            return Err(TrackerError::invalid_argument(
                "items",
                format!("duplicate id {}", key),
            ));
        }
        if !positions.insert(*position) {
            return Err(TrackerError::invalid_argument(
                "items",
                format!("duplicate position {}", position),
            ));
        }
    }
    Ok(())
}

/// Index of `key` within `siblings`, if present
pub fn slot_of<K: PartialEq>(siblings: &[(K, i64)], key: &K) -> Option<usize> {
    siblings.iter().position(|(k, _)| k == key)
}
