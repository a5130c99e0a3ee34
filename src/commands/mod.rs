pub mod help;
pub mod ping;
pub mod rates;
pub mod wallet;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, warn};

use crate::services::SharedWalletService;
use crate::utils::check_cooldown;

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };

    // Mutations share one cooldown so deposit/withdraw spam is throttled together
    let cooldown_group = match command {
        "$deposit" | "$credit" | "$add" | "$withdraw" | "$debit" | "$sub" => Some("mutate"),
        "$wallet" | "$value" | "$rates" => Some("read"),
        _ => None,
    };
    if let Some(group) = cooldown_group {
        if let Err(remaining) = check_cooldown(msg.author.id.get(), group).await {
            debug!("{} on cooldown for {} ({}s)", command, msg.author.id, remaining);
            send_embed(
                ctx,
                msg,
                CreateEmbed::default()
                    .title("Command Cooldown")
                    .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                    .color(0xffa500),
            )
            .await;
            return;
        }
    }

    let result = match command {
        "$ping" => ping::execute(ctx, msg).await,
        "$help" => help::execute(ctx, msg).await,
        "$deposit" | "$credit" | "$add" => wallet::deposit(ctx, msg, args).await,
        "$withdraw" | "$debit" | "$sub" => wallet::withdraw(ctx, msg, args).await,
        "$balance" | "$bal" => wallet::balance(ctx, msg, args).await,
        "$wallet" | "$value" => wallet::valuation(ctx, msg, args).await,
        "$rates" => rates::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        warn!("Command {} from {} failed: {}", command, msg.author.id, e);
        let user_message = if e.starts_with('❌') || e.starts_with('⚠') {
            e
        } else {
            format!("❌ {}", e)
        };

        send_embed(
            ctx,
            msg,
            CreateEmbed::default()
                .title("Command Error")
                .description(user_message)
                .color(0xff0000),
        )
        .await;
    }
}

/// Wallet service stored in the client data at startup
pub(crate) async fn wallet_service(ctx: &Context) -> Result<SharedWalletService, String> {
    let data = ctx.data.read().await;
    data.get::<crate::WalletState>()
        .cloned()
        .ok_or_else(|| "Wallet service not initialized".to_string())
}

/// Resolve the message author to a wallet user id
pub(crate) async fn resolve_user(ctx: &Context, msg: &Message) -> Result<String, String> {
    let data = ctx.data.read().await;
    let gate = data
        .get::<crate::Gate>()
        .ok_or_else(|| "Auth gate not initialized".to_string())?;

    gate.resolve(&msg.author.id.get().to_string())
        .map_err(|e| format!("❌ {}", e))
}

pub(crate) async fn send_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) {
    if let Err(e) = msg
        .channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
    {
        warn!("Failed to send reply in {}: {}", msg.channel_id, e);
    }
}
