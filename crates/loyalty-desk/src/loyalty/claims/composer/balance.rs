use super::super::domain::CustomerSnapshot;

/// Redeemable balance for a customer: earned plus referral minus used.
///
/// Signed so a snapshot that somehow overdraws still renders instead of
/// wrapping; the directory keeps the stored counters non-negative.
pub fn available_points(customer: &CustomerSnapshot) -> i64 {
    i64::from(customer.total_earned_points) + i64::from(customer.total_referral_points)
        - i64::from(customer.total_used_points)
}
