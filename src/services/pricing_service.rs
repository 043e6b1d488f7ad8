use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::extras::{ExtraOption, ExtraSelection};

pub struct PricingService;

impl PricingService {
    /// Base rate times rental days. A zero day count is billed as one day.
    pub fn rental_subtotal(base_daily_price: Decimal, days: u32) -> Decimal {
        base_daily_price * Decimal::from(days.max(1))
    }

    /// Sum of the fees of every toggled extra. Fees cover the whole rental.
    pub fn extras_total(extras: &[ExtraOption], selection: &ExtraSelection) -> Decimal {
        extras
            .iter()
            .filter(|extra| selection.is_selected(&extra.name))
            .map(|extra| extra.fee)
            .sum()
    }

    /// Full price of a rental. No rounding happens here; see `display_price`.
    pub fn aggregate(
        base_daily_price: Decimal,
        days: u32,
        extras: &[ExtraOption],
        selection: &ExtraSelection,
    ) -> Decimal {
        Self::rental_subtotal(base_daily_price, days) + Self::extras_total(extras, selection)
    }

    /// Two-digit rounding, applied only when showing a price.
    pub fn rounded(total: Decimal) -> Decimal {
        total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn display_price(total: Decimal) -> String {
        format!("€{:.2}", Self::rounded(total))
    }

    /// Amount in cents for the payment gateway.
    pub fn to_minor_units(total: Decimal) -> Option<i64> {
        (Self::rounded(total) * Decimal::ONE_HUNDRED).to_i64()
    }
}
