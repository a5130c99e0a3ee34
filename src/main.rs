use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod db;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod testing;

use api::NbpClient;
use config::Config;
use db::SqliteLedger;
use services::{AuthGate, RateCache, SharedWalletService, WalletLedger, WalletService};

struct Handler;

struct BotData;

impl TypeMapKey for BotData {
    type Value = Instant;
}

struct WalletState;

impl TypeMapKey for WalletState {
    type Value = SharedWalletService;
}

struct Gate;

impl TypeMapKey for Gate {
    type Value = AuthGate;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("currency_wallet=debug".parse().expect("static directive"))
                .add_directive("serenity=warn".parse().expect("static directive")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("💱 Starting currency wallet bot...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("Initializing database...");
    let pool = match db::init_db(&config.database_url).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    let provider = match NbpClient::new(config.nbp_base_url.clone(), config.rate_fetch_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create rate client: {}", e);
            return;
        }
    };

    let ledger = WalletLedger::new(Arc::new(SqliteLedger::new(pool)), config.storage_timeout);
    let rates = RateCache::new(Arc::new(provider), config.rate_ttl, config.rate_fetch_timeout);
    let service: SharedWalletService = Arc::new(WalletService::new(ledger, rates));
    info!("Rate cache TTL is {}s", service.rate_cache().ttl().as_secs());

    let gate = match config.wallet_users.clone() {
        Some(users) => {
            info!("Auth gate restricted to {} registered account(s)", users.len());
            AuthGate::with_users(users)
        }
        None => AuthGate::open(),
    };
    if gate.is_open() {
        warn!("WALLET_USERS not set, every Discord account gets its own wallet");
    }

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotData>(Instant::now());
        data.insert::<WalletState>(service);
        data.insert::<Gate>(gate);
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
