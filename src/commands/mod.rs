mod boxes;
mod refresh;
mod top;

use poise::serenity_prelude::GuildId;

use crate::BotState;

pub use boxes::{setup_help_box, setup_leaderboard_box, setup_submission_box};
pub use refresh::refresh_leaderboard;
pub use top::wr_top;

type CommandResult = Result<(), CommandError>;
pub type Context<'a> = poise::Context<'a, BotState, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

pub fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

pub fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

pub fn all() -> Vec<poise::Command<BotState, CommandError>> {
    vec![
        setup_submission_box(),
        setup_leaderboard_box(),
        setup_help_box(),
        refresh_leaderboard(),
        wr_top(),
    ]
}

fn guild_id(ctx: Context<'_>) -> Result<GuildId, CommandError> {
    ctx.guild_id()
        .ok_or_else(|| internal_err("This command should be executed only in a guild"))
}
