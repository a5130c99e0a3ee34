use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Instant;

use super::wallet_service;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let start_time = Instant::now();

    // Send a placeholder to measure the roundtrip, then replace it
    let response = msg
        .channel_id
        .send_message(ctx, CreateMessage::default().content("📊 Calculating metrics..."))
        .await
        .map_err(|e| e.to_string())?;
    let roundtrip = start_time.elapsed().as_millis();

    let uptime = {
        let data = ctx.data.read().await;
        match data.get::<crate::BotData>() {
            Some(started) => {
                let secs = started.elapsed().as_secs();
                format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            None => "Unknown".to_string(),
        }
    };

    let service = wallet_service(ctx).await?;
    let rates = match service.rate_cache().peek() {
        Some(table) => format!("{} cached, fetched {}", table.len(), table.fetched_at.format("%H:%M UTC")),
        None => "not fetched yet".to_string(),
    };

    let embed = CreateEmbed::default()
        .title("Pong! 🏓")
        .field("Response Roundtrip", format!("{}ms", roundtrip), true)
        .field("Uptime", uptime, true)
        .field("Wallets in memory", service.ledger().resident_count().to_string(), true)
        .field("Rates", rates, false)
        .color(0x00b0f4);

    response.delete(ctx).await.map_err(|e| e.to_string())?;
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
