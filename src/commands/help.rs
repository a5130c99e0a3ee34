use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::send_embed;
use crate::models::HOME_CURRENCY;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Currency Wallet Help")
        .description(format!(
            "Keep balances in any currency and see what they are worth in {} at NBP ask rates.",
            HOME_CURRENCY
        ))
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$ping` - Check bot latency\n`$help` - Show this help message",
            false,
        )
        .field(
            "💰 Wallet",
            "`$deposit <amount> <CODE>` - Add funds (alias `$credit`, `$add`)\n\
             `$withdraw <amount> <CODE>` - Remove funds (alias `$debit`, `$sub`)\n\
             `$balance` - List your balances",
            false,
        )
        .field(
            "📊 Valuation",
            format!(
                "`$wallet` - Value your wallet in {}\n`$rates [CODE...]` - Show current ask rates",
                HOME_CURRENCY
            ),
            false,
        )
        .field(
            "⚡ Rate Limiting",
            "Deposits and withdrawals share a short per-user cooldown",
            false,
        );

    send_embed(ctx, msg, embed).await;
    Ok(())
}
