#![forbid(unsafe_code)]

mod actors;
mod approval_service;
mod boards;
mod cards;
mod channels;
mod commands;
mod components;
mod config;
mod events;
mod flow;
mod leaderboard;
mod models;
mod platform;
mod poise_error_handler;
mod ranking;
mod repository;
mod role_sync;
mod services;
mod submission_service;
mod tiers;
mod utils;

use std::{process::exit, sync::Arc};

use config::AppConfig;
use platform::SerenityPlatform;
use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use repository::{JsonFileStorage, StoreActor, StoreHandle};
use services::Services;
use tokio::{select, signal};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
pub struct BotState {
    pub services: Services,
    pub approval_role: String,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "wr_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let store = match open_store(&app_config.data_dir).await {
        Ok(store) => store,
        Err(err) => {
            error!("Could not load the data in {}: {err}", app_config.data_dir);
            exit(255);
        }
    };

    let approval_role = app_config.approval_role.clone();

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(handle_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    if let Some(true) = app_config.register_commands_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = app_config.register_commands_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    info!("Logged in as {}", ready.user.name);

                    let platform = Arc::new(SerenityPlatform::new(
                        ctx.http.clone(),
                        ctx.cache.clone(),
                        ready.user.id,
                    ));

                    Ok(BotState {
                        services: Services::new(store, platform),
                        approval_role,
                    })
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match ClientBuilder::new(app_config.discord_bot_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            client.shard_manager.shutdown_all().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}

#[tracing::instrument]
async fn open_store(data_dir: &str) -> anyhow::Result<StoreHandle> {
    info!("Opening data directory {data_dir}");
    let storage = JsonFileStorage::open(data_dir).await?;
    let store = StoreActor::spawn(Arc::new(storage)).await?;
    info!("Done!");
    Ok(store)
}
