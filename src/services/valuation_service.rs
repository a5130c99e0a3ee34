use rust_decimal::Decimal;
use tracing::info;

use crate::models::{CurrencyCode, Rates, UserWallet, Valuation, ValuationLine};
use crate::utils::errors::WalletError;

/// Value a wallet snapshot in the home currency.
///
/// Balances without a rate are skipped, not fatal. Sums are kept unrounded;
/// rounding happens in [`Valuation::report`]. Only a table that could not be
/// fetched at all fails the valuation, as does a total too large for a
/// `Decimal`.
pub fn valuate(wallet: &UserWallet, rates: &Rates) -> Result<Valuation, WalletError> {
    let table = match rates {
        Rates::Fresh(table) | Rates::Stale(table) => table,
        Rates::Unavailable(reason) => return Err(WalletError::UpstreamUnavailable(reason.clone())),
    };

    let mut lines = Vec::with_capacity(wallet.balances.len());
    let mut skipped = Vec::new();
    let mut total = Decimal::ZERO;

    for (currency, amount) in &wallet.balances {
        let Some(rate) = table.rate(currency) else {
            info!("No rate for {} in wallet of {}, leaving it out", currency, wallet.user_id);
            skipped.push(currency.clone());
            continue;
        };

        let value = amount.checked_mul(rate).ok_or_else(|| too_large(currency))?;
        total = total.checked_add(value).ok_or_else(|| too_large(currency))?;
        lines.push(ValuationLine {
            currency: currency.clone(),
            amount: *amount,
            rate,
            value,
        });
    }

    Ok(Valuation {
        user_id: wallet.user_id.clone(),
        lines,
        total,
        skipped,
        stale: rates.is_stale(),
        effective_date: table.effective_date,
        rates_fetched_at: table.fetched_at,
    })
}

fn too_large(currency: &CurrencyCode) -> WalletError {
    WalletError::Validation(format!(
        "Wallet value is too large to compute (overflow at {})",
        currency
    ))
}
