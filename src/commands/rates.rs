use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::{send_embed, wallet_service};
use crate::models::{CurrencyCode, Rates, HOME_CURRENCY};
use crate::utils::{Align, Table};

/// `$rates [CODE...]` - the cached ask-rate table, optionally filtered
pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let filter = args
        .iter()
        .map(|raw| CurrencyCode::parse(raw).map_err(|e| format!("❌ {}", e)))
        .collect::<Result<Vec<_>, _>>()?;

    let service = wallet_service(ctx).await?;
    let rates = service.rates().await;

    let table = match &rates {
        Rates::Fresh(table) | Rates::Stale(table) => table.clone(),
        Rates::Unavailable(reason) => {
            return Err(format!("❌ Exchange rates are unavailable right now: {}", reason));
        }
    };

    let ask_header = format!("Ask ({})", HOME_CURRENCY);
    let mut rendered = Table::new(&["Code", ask_header.as_str()]).align(&[Align::Left, Align::Right]);
    for (code, rate) in table.sorted() {
        if filter.is_empty() || filter.contains(code) {
            rendered.add_row(vec![code.to_string(), rate.to_string()]);
        }
    }

    let description = if rendered.is_empty() {
        "No rates for the requested currencies.".to_string()
    } else {
        rendered.render()
    };

    let mut embed = CreateEmbed::default()
        .title("💱 Exchange Rates")
        .description(description)
        .field("Table", table.table_no.clone().unwrap_or_else(|| "-".to_string()), true)
        .field(
            "Effective",
            table
                .effective_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            true,
        );

    embed = if rates.is_stale() {
        embed
            .footer(CreateEmbedFooter::new("⚠️ Stale: last refresh failed"))
            .color(0xffa500)
    } else {
        embed.color(0x00b0f4)
    };

    send_embed(ctx, msg, embed).await;
    Ok(())
}
