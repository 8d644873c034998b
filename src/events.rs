use poise::serenity_prelude::{Context, FullEvent, Interaction};
use tracing::{info, info_span, warn, Instrument};

use crate::{commands::CommandError, components::handle_component, BotState};

pub async fn handle_event(
    ctx: &Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, BotState, CommandError>,
    data: &BotState,
) -> Result<(), CommandError> {
    match event {
        FullEvent::GuildCreate { guild, .. } => {
            let guild_id = guild.id;
            let span = info_span!("guild_setup", guild = %guild_id);

            async {
                info!("Setting up guild {}", guild.name);

                match data.services.channels.capture_all(guild_id).await {
                    Ok(found) => info!("Found {found} configured channels"),
                    Err(err) => warn!("Could not look up the channels: {err}"),
                }

                data.services
                    .publish_all_boards(guild_id, &data.approval_role)
                    .await;
            }
            .instrument(span)
            .await;
        }

        FullEvent::InteractionCreate {
            interaction: Interaction::Component(interaction),
        } => {
            handle_component(ctx, interaction, data).await?;
        }

        _ => {}
    }

    Ok(())
}
