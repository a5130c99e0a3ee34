use rust_decimal::{Decimal, RoundingStrategy};

/// Round for display only. Never feed the result back into arithmetic.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimal places
pub fn format2(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}
