use alloy_primitives::U256;

/// Decimal places of the payment token.
pub const TOKEN_DECIMALS: u32 = 6;

/// Render a base-unit amount as a human-readable decimal string, trimming
/// trailing zeros but keeping at least one fractional digit ("1.0").
///
/// Display only. Amounts on the funding path stay in `U256` base units end
/// to end; the output of this function never flows back into a computation.
pub fn format_units(amount: U256, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = (amount / scale).to_string();
    let mut frac = (amount % scale).to_string();
    while frac.len() < decimals as usize {
        frac.insert(0, '0');
    }

    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{frac}")
    }
}
