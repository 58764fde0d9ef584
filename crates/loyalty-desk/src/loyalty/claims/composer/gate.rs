use super::super::domain::Reward;

/// Whether `reward` still fits in the remaining balance. The boundary is
/// inclusive: a reward costing exactly the remaining balance is affordable.
pub fn can_afford(reward: &Reward, remaining_balance: i64) -> bool {
    i64::from(reward.required_points) <= remaining_balance
}

/// Result of a gated attempt to put a reward in the cart. Everything but
/// `Added` leaves the cart untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The reward went in; `remaining` is the balance left after it.
    Added { remaining: i64 },
    /// The reward costs `shortfall` more than the remaining balance.
    Unaffordable { shortfall: i64 },
    /// Inactive rewards are not selectable.
    Inactive,
    /// No customer is bound yet, so affordability cannot be judged.
    NoCustomer,
}

impl AddOutcome {
    pub const fn was_added(self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}
