use poise::CreateReply;

use crate::{
    boards::{BoardError, BoardUpdate},
    cards::branded,
    models::BoardKind,
};

use super::{guild_id, internal_err, user_err, CommandError, CommandResult, Context};

/// Post or update the WR submission box in this server.
#[poise::command(
    slash_command,
    guild_only,
    rename = "setup-submission-box",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn setup_submission_box(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    ctx.defer_ephemeral().await?;

    let update = ctx.data().services.publish_submission_box(guild).await;
    reply_with_update(ctx, BoardKind::SubmissionBox, update).await
}

/// Post or refresh the WR leaderboard panel in this server.
#[poise::command(
    slash_command,
    guild_only,
    rename = "setup-leaderboard-box",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn setup_leaderboard_box(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    ctx.defer_ephemeral().await?;

    let update = ctx.data().services.leaderboard.refresh(guild).await;
    reply_with_update(ctx, BoardKind::Leaderboard, update).await
}

/// Post or update the WR command index in this server.
#[poise::command(
    slash_command,
    guild_only,
    rename = "setup-help-box",
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn setup_help_box(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    ctx.defer_ephemeral().await?;

    let data = ctx.data();
    let update = data.services.publish_help(guild, &data.approval_role).await;
    reply_with_update(ctx, BoardKind::Help, update).await
}

async fn reply_with_update(
    ctx: Context<'_>,
    board: BoardKind,
    update: Result<BoardUpdate, BoardError>,
) -> CommandResult {
    let message = match update {
        Ok(BoardUpdate::Posted(_)) => format!("{} posted.", board.marker()),
        Ok(BoardUpdate::Edited(_) | BoardUpdate::Adopted(_)) => {
            format!("{} updated.", board.marker())
        }
        Ok(BoardUpdate::NoChannel) => {
            return Err(user_err(format!(
                "This server has no #{} channel.",
                board.channel().canonical_name()
            )));
        }
        Err(err) => return Err(board_err(board, err)),
    };

    ctx.send(
        CreateReply::default()
            .content(branded(message))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

fn board_err(board: BoardKind, err: BoardError) -> CommandError {
    internal_err(format!("Could not publish {}: {err}", board.marker()))
}
