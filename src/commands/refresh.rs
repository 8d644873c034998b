use poise::CreateReply;

use crate::{boards::BoardUpdate, cards::branded};

use super::{guild_id, internal_err, CommandResult, Context};

/// Recompute WRs, update roles, and refresh the leaderboard.
#[poise::command(
    slash_command,
    guild_only,
    rename = "refresh-leaderboard",
    required_permissions = "MANAGE_GUILD",
    default_member_permissions = "MANAGE_GUILD"
)]
pub async fn refresh_leaderboard(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    ctx.defer_ephemeral().await?;

    let services = &ctx.data().services;

    let report = services
        .roles
        .sync_all(guild)
        .await
        .map_err(|err| internal_err(format!("Could not update roles: {err}")))?;

    let update = services
        .leaderboard
        .refresh(guild)
        .await
        .map_err(|err| internal_err(format!("Could not refresh the leaderboard: {err}")))?;

    let mut message = format!(
        "✅ Leaderboard refreshed and roles updated ({} changed, {} unchanged).",
        report.updated, report.unchanged
    );
    if report.failed > 0 {
        message.push_str(&format!(
            "\n⚠️ Could not update {} player(s), check the bot's role permissions.",
            report.failed
        ));
    }
    if update == BoardUpdate::NoChannel {
        message.push_str("\n⚠️ This server has no #wr-leaderboard channel.");
    }

    ctx.send(
        CreateReply::default()
            .content(branded(message))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
