use std::time::Duration;

use poise::serenity_prelude::{GuildId, UserId};

use crate::models::{Metric, RunMode, SubmissionRecord};

/// How long a selection prompt waits for an answer.
pub const SELECT_TIMEOUT: Duration = Duration::from_secs(60);
/// How long a typed answer is waited for.
pub const TEXT_TIMEOUT: Duration = Duration::from_secs(120);

pub const TEAM_SIZES: [u8; 3] = [2, 3, 4];

#[derive(Clone, Debug, PartialEq)]
pub enum FlowState {
    AwaitingTeamSize,
    AwaitingPlayers {
        size: u8,
    },
    AwaitingMetric {
        players: Vec<UserId>,
    },
    AwaitingValue {
        players: Vec<UserId>,
        metric: Metric,
    },
    AwaitingNotes {
        players: Vec<UserId>,
        metric: Metric,
        value: String,
    },
    Done(SubmissionRecord),
    Aborted(AbortReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    TimedOut,
    EmptyAnswer,
}

/// An answer from the submitter, or the lack of one.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowInput {
    TeamSize(u8),
    Players(Vec<UserId>),
    Metric(Metric),
    Text(String),
    TimedOut,
}

/// A rejected answer. The flow stays in the state it was in and asks again.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("You must select exactly {expected}.")]
    WrongPlayerCount { expected: u8, got: usize },
    #[error("Teams have 2 to 4 players, not {0}.")]
    InvalidTeamSize(u8),
    #[error("That answer doesn't fit this step.")]
    UnexpectedInput,
    #[error("The submission is already finished.")]
    Finished,
}

/// Collects one submission, one answer at a time.
#[derive(Clone, Debug)]
pub struct SubmissionFlow {
    guild: GuildId,
    submitter: UserId,
    mode: RunMode,
    state: FlowState,
}

impl SubmissionFlow {
    pub fn solo(guild: GuildId, submitter: UserId) -> SubmissionFlow {
        SubmissionFlow {
            guild,
            submitter,
            mode: RunMode::Solo,
            state: FlowState::AwaitingPlayers { size: 1 },
        }
    }

    pub fn team(guild: GuildId, submitter: UserId) -> SubmissionFlow {
        SubmissionFlow {
            guild,
            submitter,
            mode: RunMode::Team,
            state: FlowState::AwaitingTeamSize,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn submitter(&self) -> UserId {
        self.submitter
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, FlowState::Done(_) | FlowState::Aborted(_))
    }

    /// How long the current step waits for an answer. `None` once finished.
    pub fn timeout(&self) -> Option<Duration> {
        use FlowState::*;

        match self.state {
            AwaitingTeamSize | AwaitingPlayers { .. } | AwaitingMetric { .. } => {
                Some(SELECT_TIMEOUT)
            }
            AwaitingValue { .. } | AwaitingNotes { .. } => Some(TEXT_TIMEOUT),
            Done(_) | Aborted(_) => None,
        }
    }

    pub fn advance(&mut self, input: FlowInput) -> Result<&FlowState, FlowError> {
        if self.is_finished() {
            return Err(FlowError::Finished);
        }

        if input == FlowInput::TimedOut {
            self.state = FlowState::Aborted(AbortReason::TimedOut);
            return Ok(&self.state);
        }

        let next = match (&self.state, input) {
            (FlowState::AwaitingTeamSize, FlowInput::TeamSize(size)) => {
                if !TEAM_SIZES.contains(&size) {
                    return Err(FlowError::InvalidTeamSize(size));
                }
                FlowState::AwaitingPlayers { size }
            }

            (FlowState::AwaitingPlayers { size }, FlowInput::Players(players)) => {
                let players = distinct(players);
                if players.is_empty() {
                    FlowState::Aborted(AbortReason::EmptyAnswer)
                } else if players.len() != *size as usize {
                    return Err(FlowError::WrongPlayerCount {
                        expected: *size,
                        got: players.len(),
                    });
                } else {
                    FlowState::AwaitingMetric { players }
                }
            }

            (FlowState::AwaitingMetric { players }, FlowInput::Metric(metric)) => {
                FlowState::AwaitingValue {
                    players: players.clone(),
                    metric,
                }
            }

            (FlowState::AwaitingValue { players, metric }, FlowInput::Text(text)) => {
                let value = text.trim();
                if value.is_empty() {
                    FlowState::Aborted(AbortReason::EmptyAnswer)
                } else {
                    FlowState::AwaitingNotes {
                        players: players.clone(),
                        metric: *metric,
                        value: value.to_string(),
                    }
                }
            }

            (
                FlowState::AwaitingNotes {
                    players,
                    metric,
                    value,
                },
                FlowInput::Text(text),
            ) => {
                let notes = text.trim();
                let notes = if notes.is_empty() || notes.eq_ignore_ascii_case("skip") {
                    None
                } else {
                    Some(notes.to_string())
                };

                FlowState::Done(SubmissionRecord {
                    guild_id: self.guild,
                    submitter_id: self.submitter,
                    mode: self.mode,
                    size: players.len() as u8,
                    players: players.clone(),
                    metric: *metric,
                    value: value.clone(),
                    notes,
                })
            }

            _ => return Err(FlowError::UnexpectedInput),
        };

        self.state = next;
        Ok(&self.state)
    }
}

/// Drops repeated players, keeping the selection order.
fn distinct(players: Vec<UserId>) -> Vec<UserId> {
    let mut seen = Vec::with_capacity(players.len());
    for player in players {
        if !seen.contains(&player) {
            seen.push(player);
        }
    }
    seen
}
