use poise::{CreateReply, FrameworkError};
use tracing::{error, warn};

use crate::{
    cards::branded,
    commands::{CommandError, Context},
    BotState,
};

pub async fn handle_error(error: FrameworkError<'_, BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Error in bot setup: {error}");
        }

        EventHandler { error, event, .. } => {
            error!("Error in {} handler: {error}", event.snake_case_name());
        }

        Command { error, ctx, .. } => match error {
            CommandError::User { message } => {
                reply_with_error(ctx, &message).await;
            }

            CommandError::Internal { message } => {
                error!("Internal error in /{}: {message}", ctx.command().qualified_name);
                reply_with_internal_error(ctx, &message).await;
            }

            CommandError::Serenity(err) => {
                error!("Discord error in /{}: {err}", ctx.command().qualified_name);
                reply_with_internal_error(ctx, &err.to_string()).await;
            }
        },

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let response = match input {
                Some(input) => format!("Cannot read `{input}`: {error}"),
                None => error.to_string(),
            };

            reply_with_error(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Failed to read the arguments of /{}: {description}",
                ctx.command.qualified_name
            );
        }

        MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            reply_with_error(
                ctx,
                &format!("The bot lacks these permissions here: {missing_permissions}"),
            )
            .await;
        }

        MissingUserPermissions { ctx, .. } => {
            reply_with_error(ctx, "You don't have permission to run this command.").await;
        }

        GuildOnly { ctx, .. } => {
            reply_with_error(ctx, "This command only works in a server.").await;
        }

        CommandCheckFailed { error, ctx, .. } => {
            let message = match error {
                Some(error) => format!("You can't run this command: {error}"),
                None => "You can't run this command.".to_string(),
            };

            reply_with_error(ctx, &message).await;
        }

        UnknownInteraction { interaction, .. } => {
            warn!("Received an unknown command: {}", interaction.data.name);
        }

        error => {
            error!("Unhandled framework error: {error}");
        }
    }
}

async fn reply_with_error(ctx: Context<'_>, message: &str) {
    let content = branded(message);

    if let Err(err) =
        poise::send_reply(ctx, CreateReply::default().content(&content).ephemeral(true)).await
    {
        error!("Failed to send an error message to the user: {err}\nThe message was: {content}");
    }
}

async fn reply_with_internal_error(ctx: Context<'_>, message: &str) {
    reply_with_error(ctx, &format!("Something went wrong: {message}")).await;
}
