//! Handling of the persistent buttons the bot posts.

use poise::serenity_prelude::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, GuildId,
};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    approval_service::{ApprovalError, ApprovalReport, RejectionReport},
    boards::BoardUpdate,
    cards::branded,
    commands::CommandError,
    flow::{FlowDriver, SubmissionFlow},
    platform::custom_ids,
    role_sync::RoleSyncOutcome,
    utils::formatting::mention_list,
    BotState,
};

/// Whether a member may approve or reject submissions.
pub fn is_approver<'a>(
    role_names: impl IntoIterator<Item = &'a str>,
    is_administrator: bool,
    approval_role: &str,
) -> bool {
    is_administrator || role_names.into_iter().any(|name| name == approval_role)
}

pub async fn handle_component(
    ctx: &Context,
    interaction: &ComponentInteraction,
    data: &BotState,
) -> Result<(), CommandError> {
    let Some(guild) = interaction.guild_id else {
        debug!("Ignoring a component interaction outside of a guild");
        return Ok(());
    };

    match interaction.data.custom_id.as_str() {
        custom_ids::SUBMIT_SOLO => {
            start_flow(ctx, interaction, data, SubmissionFlow::solo(guild, interaction.user.id))
        }

        custom_ids::SUBMIT_TEAM => {
            start_flow(ctx, interaction, data, SubmissionFlow::team(guild, interaction.user.id))
        }

        custom_ids::APPROVE => review(ctx, interaction, data, guild, true).await?,

        custom_ids::REJECT => review(ctx, interaction, data, guild, false).await?,

        custom_ids::LEADERBOARD_REFRESH => {
            interaction.defer_ephemeral(ctx).await?;

            let message = match data.services.leaderboard.refresh(guild).await {
                Ok(_) => "🔄 Leaderboard refreshed.".to_string(),
                Err(err) => {
                    warn!("Could not refresh the leaderboard: {err}");
                    format!("Could not refresh the leaderboard: {err}")
                }
            };
            followup(ctx, interaction, &message).await?;
        }

        // Selects of running flows are picked up by their collectors.
        other => debug!("Ignoring component {other}"),
    }

    Ok(())
}

/// Runs the flow on its own task, it can wait for answers for several minutes.
fn start_flow(
    ctx: &Context,
    interaction: &ComponentInteraction,
    data: &BotState,
    flow: SubmissionFlow,
) {
    let ctx = ctx.clone();
    let interaction = interaction.clone();
    let services = data.services.clone();

    tokio::spawn(
        async move {
            let driver = FlowDriver::new(&ctx, &interaction, &services);
            if let Err(err) = driver.run(flow).await {
                error!("Submission flow failed: {err}");
            }
        }
        .instrument(info_span!("submission_flow")),
    );
}

async fn review(
    ctx: &Context,
    interaction: &ComponentInteraction,
    data: &BotState,
    guild: GuildId,
    approve: bool,
) -> Result<(), CommandError> {
    let allowed = match &interaction.member {
        Some(member) => {
            let is_administrator = member
                .permissions
                .map(|permissions| permissions.administrator())
                .unwrap_or(false);

            let role_names: Vec<String> = match data.services.platform.guild_roles(guild).await {
                Ok(roles) => roles
                    .into_iter()
                    .filter(|role| member.roles.contains(&role.id))
                    .map(|role| role.name)
                    .collect(),
                Err(err) => {
                    warn!("Could not list the guild roles: {err}");
                    Vec::new()
                }
            };

            is_approver(
                role_names.iter().map(String::as_str),
                is_administrator,
                &data.approval_role,
            )
        }
        None => false,
    };

    if !allowed {
        interaction
            .create_response(
                ctx,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(branded(format!(
                            "Only **{}** can review submissions.",
                            data.approval_role
                        )))
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    interaction.defer_ephemeral(ctx).await?;

    let channel = interaction.channel_id;
    let message = interaction.message.id;
    let approvals = &data.services.approvals;

    let reply = if approve {
        match approvals.approve(channel, message, interaction.user.id).await {
            Ok(report) => {
                info!(
                    "{} approved a {} run by {}",
                    interaction.user.id,
                    report.approved.record.mode_label(),
                    report.approved.record.submitter_id
                );
                approval_reply(&report)
            }
            Err(err) => review_error(err),
        }
    } else {
        match approvals.reject(channel, message).await {
            Ok(report) => {
                info!(
                    "{} rejected a {} run by {}",
                    interaction.user.id,
                    report.rejected.record.mode_label(),
                    report.rejected.record.submitter_id
                );
                rejection_reply(&report)
            }
            Err(err) => review_error(err),
        }
    };

    followup(ctx, interaction, &reply).await
}

/// The reviewer's summary of an approval, with a line per follow-up step that failed.
fn approval_reply(report: &ApprovalReport) -> String {
    let mut lines = vec![if report.role_sync_failures == 0 {
        "✅ Approved and roles updated.".to_string()
    } else {
        format!(
            "✅ Approved, but the roles of {} player(s) could not be updated.",
            report.role_sync_failures
        )
    }];

    let promoted = report
        .role_sync
        .iter()
        .filter(|(_, outcome)| matches!(outcome, RoleSyncOutcome::Updated { added: Some(_), .. }))
        .map(|(player, _)| *player)
        .collect::<Vec<_>>();
    if !promoted.is_empty() {
        lines.push(format!("🏅 New tier for {}.", mention_list(&promoted)));
    }

    if !report.card_updated {
        lines.push("⚠️ The review card could not be updated.".to_string());
    }
    if report.announcement.is_none() {
        lines.push("⚠️ The run was not announced in #world-records.".to_string());
    }
    match report.leaderboard {
        Some(BoardUpdate::NoChannel) => {
            lines.push("⚠️ This server has no #wr-leaderboard channel.".to_string())
        }
        None => lines.push("⚠️ The leaderboard could not be refreshed.".to_string()),
        Some(_) => {}
    }

    lines.join("\n")
}

fn rejection_reply(report: &RejectionReport) -> String {
    if report.card_updated {
        "❌ Submission rejected.".to_string()
    } else {
        "❌ Submission rejected, but the review card could not be updated.".to_string()
    }
}

fn review_error(err: ApprovalError) -> String {
    match err {
        ApprovalError::NotFound => err.to_string(),
        ApprovalError::Repository(err) => {
            error!("Could not update the submission: {err}");
            format!("Could not update the submission: {err}")
        }
    }
}

async fn followup(
    ctx: &Context,
    interaction: &ComponentInteraction,
    content: &str,
) -> Result<(), CommandError> {
    interaction
        .create_followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .content(branded(content))
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
