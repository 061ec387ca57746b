use rust_decimal::Decimal;

/// Decimal places used for presentation.
///
/// Amounts keep full precision while they accumulate; rounding happens once,
/// when a report bundle is assembled.
pub const DISPLAY_SCALE: u32 = 2;

/// Round an amount to presentation scale (banker's rounding via `round_dp`)
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp(DISPLAY_SCALE)
}

/// Format an amount for display with exactly two decimal places
pub fn format_display(amount: Decimal) -> String {
    format!("{:.2}", round_display(amount))
}

/// Percentage of `part` over `whole`, with a divide-by-zero guard.
///
/// Returns exactly zero when `whole` is zero, never NaN, infinity or a
/// panic. Full precision; callers round at presentation time.
pub fn ratio_pct(part: Decimal, whole: Decimal) -> Decimal {
    if whole == Decimal::ZERO {
        Decimal::ZERO
    } else {
        Decimal::ONE_HUNDRED * part / whole
    }
}
