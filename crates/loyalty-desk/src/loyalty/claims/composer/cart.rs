use serde::{Deserialize, Serialize};

use super::super::domain::{CustomerSnapshot, Reward, RewardId};
use super::balance::available_points;

/// Ordered list of rewards picked for one claim in progress. Duplicates are
/// allowed: two entries of the same reward mean two units.
///
/// The cart is plain data. It appends whatever it is told to append; the
/// affordability gate and the submission validator decide what is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCart {
    entries: Vec<Reward>,
}

impl RewardCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional append at the end of the cart.
    pub fn push(&mut self, reward: Reward) {
        self.entries.push(reward);
    }

    /// Remove and return the entry at `index`, keeping the rest in their
    /// original relative order. Out-of-range indexes are a reported no-op.
    pub fn remove(&mut self, index: usize) -> Option<Reward> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Reward] {
        &self.entries
    }

    /// Cart-ordered reward ids, as the submission payload carries them.
    pub fn reward_ids(&self) -> Vec<RewardId> {
        self.entries.iter().map(|reward| reward.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of the entry costs; zero for an empty cart.
    pub fn total_cost(&self) -> u32 {
        self.entries
            .iter()
            .map(|reward| reward.required_points)
            .sum()
    }

    /// Balance left after the cart. May be negative; that is a valid,
    /// observable state used to drive warnings, not an error.
    pub fn remaining_balance(&self, customer: &CustomerSnapshot) -> i64 {
        available_points(customer) - i64::from(self.total_cost())
    }
}
