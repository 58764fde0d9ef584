//! The claim composer: balance arithmetic, the reward cart, the
//! affordability gate, and the submission validator, tied together by
//! [`ClaimDraft`] for the lifetime of one create-claim session.

mod balance;
mod cart;
mod gate;
mod submit;

pub use balance::available_points;
pub use cart::RewardCart;
pub use gate::{can_afford, AddOutcome};
pub use submit::{validate, SubmissionError};

use super::domain::{ClaimSubmission, CustomerSnapshot, Reward};

/// One create-claim session: the selected customer, the cart, and remarks.
///
/// A draft lives from the moment the operator opens the create-claim screen
/// until the claim is submitted or abandoned. A failed submission leaves
/// the draft untouched so it can be corrected and resubmitted.
#[derive(Debug, Clone, Default)]
pub struct ClaimDraft {
    customer: Option<CustomerSnapshot>,
    cart: RewardCart,
    remarks: Option<String>,
}

impl ClaimDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or refresh the customer the claim is composed for.
    ///
    /// Picking a different customer clears the cart: the balance its entries
    /// were judged against no longer applies. Re-fetching the same customer
    /// only swaps in the fresher snapshot.
    pub fn select_customer(&mut self, snapshot: CustomerSnapshot) {
        let switched = self.customer.as_ref().map(|current| current.id) != Some(snapshot.id);
        if switched {
            self.cart.clear();
        }
        self.customer = Some(snapshot);
    }

    pub fn customer(&self) -> Option<&CustomerSnapshot> {
        self.customer.as_ref()
    }

    pub fn cart(&self) -> &RewardCart {
        &self.cart
    }

    pub fn set_remarks(&mut self, remarks: impl Into<String>) {
        self.remarks = Some(remarks.into());
    }

    /// Gated add. Inactive and unaffordable rewards leave the cart
    /// untouched; the outcome says why so the screen can label the row.
    pub fn try_add(&mut self, reward: Reward) -> AddOutcome {
        let Some(customer) = &self.customer else {
            return AddOutcome::NoCustomer;
        };
        if !reward.is_active {
            return AddOutcome::Inactive;
        }

        let remaining = self.cart.remaining_balance(customer);
        if !can_afford(&reward, remaining) {
            return AddOutcome::Unaffordable {
                shortfall: i64::from(reward.required_points) - remaining,
            };
        }

        self.cart.push(reward);
        AddOutcome::Added {
            remaining: self.cart.remaining_balance(customer),
        }
    }

    /// Append without consulting the gate, for callers that already ran it.
    /// The submission validator still re-checks the total.
    pub fn add_unchecked(&mut self, reward: Reward) {
        self.cart.push(reward);
    }

    /// Remove the cart entry at `index`; out-of-range is a reported no-op.
    pub fn remove(&mut self, index: usize) -> Option<Reward> {
        self.cart.remove(index)
    }

    pub fn total_cost(&self) -> u32 {
        self.cart.total_cost()
    }

    /// Balance left after the cart, or `None` before a customer is bound.
    /// Negative values are valid and drive the overdraft warning.
    pub fn remaining_balance(&self) -> Option<i64> {
        self.customer
            .as_ref()
            .map(|customer| self.cart.remaining_balance(customer))
    }

    /// Run the submission validator over the current draft state.
    pub fn submission(&self) -> Result<ClaimSubmission, SubmissionError> {
        validate(self.customer.as_ref(), &self.cart, self.remarks.as_deref())
    }
}
