use super::super::domain::{ClaimSubmission, CustomerSnapshot};
use super::balance::available_points;
use super::cart::RewardCart;

/// Why a submit attempt was turned away before reaching the claim store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("no customer selected")]
    MissingCustomer,
    #[error("select at least one reward")]
    EmptyCart,
    #[error("claim needs {required} points but only {available} are available")]
    InsufficientBalance { required: u32, available: i64 },
}

/// Final gate before a claim leaves the composer. Stateless; evaluated once
/// per attempt.
///
/// Checks run in precedence order: customer, cart, balance. The balance
/// check is deliberately redundant with the affordability gate: entries can
/// reach the cart through paths that never consulted it.
pub fn validate(
    customer: Option<&CustomerSnapshot>,
    cart: &RewardCart,
    remarks: Option<&str>,
) -> Result<ClaimSubmission, SubmissionError> {
    let customer = customer.ok_or(SubmissionError::MissingCustomer)?;

    if cart.is_empty() {
        return Err(SubmissionError::EmptyCart);
    }

    if cart.remaining_balance(customer) < 0 {
        return Err(SubmissionError::InsufficientBalance {
            required: cart.total_cost(),
            available: available_points(customer),
        });
    }

    Ok(ClaimSubmission {
        customer_id: customer.id,
        reward_ids: cart.reward_ids(),
        remarks: remarks
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
    })
}
