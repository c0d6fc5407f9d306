//! Fantasy points normalization
//!
//! Sleeper reports a season total as a whole part plus a hundredths part
//! (`fpts` / `fpts_decimal`). Combining them in decimal arithmetic keeps the
//! value exact, so the only rounding that ever happens is the one-decimal
//! display rounding below.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for display and ranking
pub const DISPLAY_DECIMALS: u32 = 1;

/// Combine `whole + hundredths / 100`; absent parts count as zero
pub fn normalize_points(whole: Option<Decimal>, hundredths: Option<Decimal>) -> Decimal {
    let whole = whole.unwrap_or(Decimal::ZERO);
    let hundredths = hundredths.unwrap_or(Decimal::ZERO);
    whole + hundredths / Decimal::ONE_HUNDRED
}

/// Round to one decimal place, halves away from zero (7.25 -> 7.3).
///
/// The result always carries exactly one decimal digit, so `600` displays as
/// `600.0`.
pub fn round_points(points: Decimal) -> Decimal {
    let mut rounded =
        points.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DECIMALS);
    rounded
}
