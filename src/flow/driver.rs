use std::time::Duration;

use poise::serenity_prelude::{
    ComponentInteraction, ComponentInteractionDataKind, Context, CreateActionRow,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, Message, MessageCollector, UserId,
};
use tracing::{debug, info, warn};

use crate::{
    cards::branded,
    models::{Metric, RunMode},
    services::Services,
};

use super::{AbortReason, FlowInput, FlowState, SubmissionFlow, SELECT_TIMEOUT, TEAM_SIZES};

const TEAM_SIZE_ID: &str = "wr_team_size";
const PLAYERS_ID: &str = "wr_players";
const METRIC_ID: &str = "wr_metric";

/// Runs a submission flow over ephemeral follow-ups of the button interaction that
/// started it.
pub struct FlowDriver<'a> {
    ctx: &'a Context,
    interaction: &'a ComponentInteraction,
    services: &'a Services,
}

impl<'a> FlowDriver<'a> {
    pub fn new(
        ctx: &'a Context,
        interaction: &'a ComponentInteraction,
        services: &'a Services,
    ) -> FlowDriver<'a> {
        FlowDriver {
            ctx,
            interaction,
            services,
        }
    }

    #[tracing::instrument(skip_all, fields(user = %self.interaction.user.id, mode = ?flow.mode()))]
    pub async fn run(&self, mut flow: SubmissionFlow) -> Result<(), serenity::Error> {
        self.interaction.defer_ephemeral(self.ctx).await?;

        while !flow.is_finished() {
            let Some(input) = self.ask(&flow).await? else {
                self.say("Please pick one of the offered options.").await?;
                continue;
            };

            if let Err(err) = flow.advance(input) {
                debug!("Answer rejected: {err}");
                self.say(&err.to_string()).await?;
            }
        }

        match flow.state() {
            FlowState::Done(record) => match self.services.intake.enqueue(record.clone()).await {
                Ok(_) => {
                    self.say("🏆 Submitted for review.").await?;
                }
                Err(err) => {
                    warn!("Could not enqueue a finished submission: {err}");
                    self.say(&format!("Could not submit the run: {err}")).await?;
                }
            },

            FlowState::Aborted(AbortReason::TimedOut) => {
                info!("Submission timed out");
                self.say("Timed out.").await?;
            }

            FlowState::Aborted(AbortReason::EmptyAnswer) => {
                info!("Submission abandoned with an empty answer");
                self.say("Nothing entered, submission cancelled.").await?;
            }

            state => warn!("Flow stopped in an unfinished state: {state:?}"),
        }

        Ok(())
    }

    /// Prompts for the current step. `None` if the answer couldn't be read.
    async fn ask(&self, flow: &SubmissionFlow) -> Result<Option<FlowInput>, serenity::Error> {
        let timeout = flow.timeout().unwrap_or(SELECT_TIMEOUT);

        match flow.state() {
            FlowState::AwaitingTeamSize => {
                let options = TEAM_SIZES
                    .iter()
                    .map(|size| CreateSelectMenuOption::new(format!("{size} Players"), size.to_string()))
                    .collect();
                let menu = CreateSelectMenu::new(TEAM_SIZE_ID, CreateSelectMenuKind::String { options })
                    .placeholder("Team size");

                let answer = self.select("Choose **team size**.", menu, timeout).await?;
                Ok(match answer {
                    Some(ComponentInteractionDataKind::StringSelect { values }) => values
                        .first()
                        .and_then(|value| value.parse().ok())
                        .map(FlowInput::TeamSize),
                    Some(_) => None,
                    None => Some(FlowInput::TimedOut),
                })
            }

            FlowState::AwaitingPlayers { size } => {
                let (prompt, placeholder) = if *size == 1 {
                    ("Choose the **runner**.".to_string(), "Select runner".to_string())
                } else {
                    (
                        format!("Pick **{size} players** for the team."),
                        format!("Pick exactly {size} players"),
                    )
                };
                let menu = CreateSelectMenu::new(
                    PLAYERS_ID,
                    CreateSelectMenuKind::User {
                        default_users: None,
                    },
                )
                .placeholder(placeholder)
                .min_values(*size)
                .max_values(*size);

                let answer = self.select(&prompt, menu, timeout).await?;
                Ok(match answer {
                    Some(ComponentInteractionDataKind::UserSelect { values }) => {
                        Some(FlowInput::Players(values))
                    }
                    Some(_) => None,
                    None => Some(FlowInput::TimedOut),
                })
            }

            FlowState::AwaitingMetric { .. } => {
                let options = [Metric::Time, Metric::Damage]
                    .into_iter()
                    .map(|metric| {
                        CreateSelectMenuOption::new(
                            format!("{} {}", metric.label(), metric.icon()),
                            metric.label().to_lowercase(),
                        )
                    })
                    .collect();
                let menu = CreateSelectMenu::new(METRIC_ID, CreateSelectMenuKind::String { options })
                    .placeholder("Time or Damage?");

                let answer = self
                    .select("Choose **Time** or **Damage**.", menu, timeout)
                    .await?;
                Ok(match answer {
                    Some(ComponentInteractionDataKind::StringSelect { values }) => {
                        match values.first().map(String::as_str) {
                            Some("time") => Some(FlowInput::Metric(Metric::Time)),
                            Some("damage") => Some(FlowInput::Metric(Metric::Damage)),
                            _ => None,
                        }
                    }
                    Some(_) => None,
                    None => Some(FlowInput::TimedOut),
                })
            }

            FlowState::AwaitingValue { metric, .. } => {
                let who = match flow.mode() {
                    RunMode::Solo => "your",
                    RunMode::Team => "your team",
                };
                let prompt = match metric {
                    Metric::Time => format!("Enter {who} **run time** (e.g., 12:34.56)."),
                    Metric::Damage => format!("Enter {who} **damage** (number)."),
                };
                self.text(&prompt, timeout).await.map(Some)
            }

            FlowState::AwaitingNotes { .. } => {
                self.text("Add **notes** (optional). Type `skip` to leave blank.", timeout)
                    .await
                    .map(Some)
            }

            // The loop stops before asking a finished flow.
            FlowState::Done(_) | FlowState::Aborted(_) => Ok(Some(FlowInput::TimedOut)),
        }
    }

    async fn say(&self, content: &str) -> Result<Message, serenity::Error> {
        self.interaction
            .create_followup(
                self.ctx,
                CreateInteractionResponseFollowup::new()
                    .content(branded(content))
                    .ephemeral(true),
            )
            .await
    }

    /// Shows a select menu and waits for the submitter to pick. `None` on timeout.
    async fn select(
        &self,
        prompt: &str,
        menu: CreateSelectMenu,
        timeout: Duration,
    ) -> Result<Option<ComponentInteractionDataKind>, serenity::Error> {
        let message = self
            .interaction
            .create_followup(
                self.ctx,
                CreateInteractionResponseFollowup::new()
                    .content(branded(prompt))
                    .components(vec![CreateActionRow::SelectMenu(menu)])
                    .ephemeral(true),
            )
            .await?;

        let Some(answer) = message
            .await_component_interaction(&self.ctx.shard)
            .author_id(self.submitter())
            .timeout(timeout)
            .await
        else {
            return Ok(None);
        };

        answer
            .create_response(
                self.ctx,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content(branded("✅ Got it."))
                        .components(Vec::new()),
                ),
            )
            .await?;

        Ok(Some(answer.data.kind))
    }

    /// Asks for a typed answer in the channel the flow was started from.
    async fn text(&self, prompt: &str, timeout: Duration) -> Result<FlowInput, serenity::Error> {
        self.say(prompt).await?;

        let Some(answer) = MessageCollector::new(&self.ctx.shard)
            .author_id(self.submitter())
            .channel_id(self.interaction.channel_id)
            .timeout(timeout)
            .await
        else {
            return Ok(FlowInput::TimedOut);
        };

        // The answer may hold a record value, keep the channel clean.
        if let Err(err) = answer.delete(self.ctx).await {
            debug!("Could not delete the answer message: {err}");
        }

        Ok(FlowInput::Text(answer.content))
    }

    fn submitter(&self) -> UserId {
        self.interaction.user.id
    }
}
