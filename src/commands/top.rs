use poise::CreateReply;

use crate::{
    models::{Metric, RunMode},
    platform::create_embed,
    ranking::{best_runs, render_top},
};

use super::{guild_id, internal_err, user_err, CommandResult, Context};

/// Show the best approved runs of a category.
#[poise::command(slash_command, guild_only, rename = "wr-top")]
pub async fn wr_top(
    ctx: Context<'_>,
    #[description = "Time or damage"] metric: Metric,
    #[description = "Solo or team runs"] mode: RunMode,
    #[description = "Team size (2 to 4), team runs only"]
    #[min = 2]
    #[max = 4]
    size: Option<u8>,
) -> CommandResult {
    let guild = guild_id(ctx)?;

    let size = match (mode, size) {
        (RunMode::Solo, None) => 1,
        (RunMode::Solo, Some(_)) => {
            return Err(user_err("Solo runs don't have a team size."));
        }
        (RunMode::Team, size) => size.unwrap_or(2),
    };
    if mode == RunMode::Team && !(2..=4).contains(&size) {
        return Err(user_err("Teams have 2 to 4 players."));
    }

    let approved = ctx
        .data()
        .services
        .submissions
        .approved_in_guild(guild)
        .await
        .map_err(|err| internal_err(format!("Could not load the records: {err}")))?;

    let best = best_runs(&approved, metric, mode, size);
    let card = render_top(&best, metric, mode, size);

    ctx.send(
        CreateReply::default()
            .embed(create_embed(&card))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
