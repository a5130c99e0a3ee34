use std::str::FromStr;

use rust_decimal::Decimal;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{resolve_user, send_embed, wallet_service};
use crate::models::{BalanceChange, Valuation, HOME_CURRENCY};
use crate::utils::{format2, Align, Table};

/// `$deposit <amount> <CODE>`
pub async fn deposit(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.first().map_or(true, |a| *a == "help") {
        send_embed(ctx, msg, usage_embed("💰 Deposit", "$deposit", "Add funds to your wallet")).await;
        return Ok(());
    }

    let (amount, code) = parse_amount_and_code(args)?;
    let user_id = resolve_user(ctx, msg).await?;
    let service = wallet_service(ctx).await?;

    let change = service
        .credit(&user_id, code, amount)
        .await
        .map_err(|e| format!("❌ Deposit failed: {}", e))?;

    send_embed(ctx, msg, change_embed("💰 Deposit", amount, &change)).await;
    Ok(())
}

/// `$withdraw <amount> <CODE>`
pub async fn withdraw(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.first().map_or(true, |a| *a == "help") {
        send_embed(ctx, msg, usage_embed("💸 Withdraw", "$withdraw", "Take funds out of your wallet")).await;
        return Ok(());
    }

    let (amount, code) = parse_amount_and_code(args)?;
    let user_id = resolve_user(ctx, msg).await?;
    let service = wallet_service(ctx).await?;

    let change = service
        .debit(&user_id, code, amount)
        .await
        .map_err(|e| format!("❌ Withdrawal failed: {}", e))?;

    send_embed(ctx, msg, change_embed("💸 Withdraw", amount, &change)).await;
    Ok(())
}

/// `$balance` - raw balances, no valuation
pub async fn balance(ctx: &Context, msg: &Message, _args: &[&str]) -> Result<(), String> {
    let user_id = resolve_user(ctx, msg).await?;
    let service = wallet_service(ctx).await?;

    let wallet = service
        .balances(&user_id)
        .await
        .map_err(|e| format!("❌ Failed to get balance: {}", e))?;

    let description = if wallet.is_empty() {
        "Your wallet is empty. Use `$deposit <amount> <CODE>` to add funds.".to_string()
    } else {
        let mut table = Table::new(&["Code", "Amount"]).align(&[Align::Left, Align::Right]);
        for (code, amount) in &wallet.balances {
            table.add_row(vec![code.to_string(), format2(*amount)]);
        }
        table.render()
    };

    send_embed(
        ctx,
        msg,
        CreateEmbed::default()
            .title("👛 Balance")
            .field("User", format!("<@{}>", msg.author.id.get()), false)
            .description(description)
            .color(0x00b0f4),
    )
    .await;
    Ok(())
}

/// `$wallet` - balances valued in the home currency
pub async fn valuation(ctx: &Context, msg: &Message, _args: &[&str]) -> Result<(), String> {
    let user_id = resolve_user(ctx, msg).await?;
    let service = wallet_service(ctx).await?;

    let valuation = service
        .valuate_wallet(&user_id)
        .await
        .map_err(|e| format!("❌ Could not value wallet: {}", e))?;

    send_embed(ctx, msg, valuation_embed(&valuation)).await;
    Ok(())
}

/// Parse `<amount> <CODE>`. Accepts a decimal comma (`12,50`).
pub fn parse_amount_and_code<'a>(args: &[&'a str]) -> Result<(Decimal, &'a str), String> {
    let [amount, code] = args else {
        return Err("❌ Expected `<amount> <CODE>`, e.g. `100 USD`".to_string());
    };

    let amount = Decimal::from_str(&amount.replace(',', "."))
        .map_err(|_| format!("❌ '{}' is not a valid amount", amount))?;

    Ok((amount, *code))
}

fn usage_embed(title: &str, command: &str, description: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .description(description)
        .field("Usage", format!("`{} <amount> <CODE>`", command), false)
        .field("Examples", format!("`{0} 100 USD`\n`{0} 12,50 eur`", command), false)
        .field(
            "Notes",
            "• Currency code is 3 letters, case-insensitive\n\
             • Amount must be positive",
            false,
        )
        .color(0x00ff00)
}

fn change_embed(title: &str, amount: Decimal, change: &BalanceChange) -> CreateEmbed {
    let new_balance = if change.removed {
        format!("0.00 {} (entry closed)", change.currency)
    } else {
        format!("{} {}", format2(change.new_total), change.currency)
    };

    let mut embed = CreateEmbed::default()
        .title(title)
        .field("Amount", format!("{} {}", format2(amount), change.currency), true)
        .field("New balance", new_balance, true);

    if change.is_persisted() {
        return embed.color(0x00ff00);
    }

    let reason = change
        .warning
        .as_ref()
        .map(|w| w.to_string())
        .unwrap_or_default();
    embed
        .field(
            "⚠️ Not saved",
            format!("Your balance was updated but could not be saved: {}", reason),
            false,
        )
        .color(0xffa500)
}

fn valuation_embed(valuation: &Valuation) -> CreateEmbed {
    let report = valuation.report();

    let description = if report.lines.is_empty() {
        "Nothing to value.".to_string()
    } else {
        let mut table = Table::new(&["Code", "Amount", "Rate", HOME_CURRENCY])
            .align(&[Align::Left, Align::Right, Align::Right, Align::Right]);
        for line in &report.lines {
            table.add_row(vec![
                line.currency.clone(),
                format2(line.amount),
                format2(line.rate),
                format2(line.value),
            ]);
        }
        table.set_footer(vec![
            "Total".to_string(),
            String::new(),
            String::new(),
            format2(report.total),
        ]);
        table.render()
    };

    let rates_date = report
        .effective_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| report.rates_fetched_at.format("%Y-%m-%d %H:%M UTC").to_string());

    let mut embed = CreateEmbed::default()
        .title("📊 Wallet Value")
        .description(description)
        .field("Total", format!("{} {}", format2(report.total), HOME_CURRENCY), true)
        .field("Rates from", rates_date, true);

    if !report.skipped.is_empty() {
        embed = embed.field("Not valued (no rate)", report.skipped.join(", "), false);
    }

    if report.stale {
        embed
            .footer(CreateEmbedFooter::new("⚠️ Rate provider unreachable; using the last known rates"))
            .color(0xffa500)
    } else {
        embed.color(0x00b0f4)
    }
}
