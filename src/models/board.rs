use poise::serenity_prelude::{ChannelId, MessageId};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::{types::snowflake, ChannelKey};

/// A single "live" message the bot keeps editing instead of reposting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum BoardKind {
    Help,
    SubmissionBox,
    Leaderboard,
}

impl BoardKind {
    /// The embed title that identifies the board among the bot's own messages.
    pub fn marker(&self) -> &'static str {
        match self {
            BoardKind::Help => "[WR COMMANDS]",
            BoardKind::SubmissionBox => "[WR SUBMISSION BOX]",
            BoardKind::Leaderboard => "[WR LEADERBOARD]",
        }
    }

    pub fn channel(&self) -> ChannelKey {
        match self {
            BoardKind::Help => ChannelKey::Info,
            BoardKind::SubmissionBox => ChannelKey::Submissions,
            BoardKind::Leaderboard => ChannelKey::Leaderboard,
        }
    }

    /// The key the board is stored under in the pins document.
    pub fn pin_key(&self) -> &'static str {
        match self {
            BoardKind::Help => "help",
            BoardKind::SubmissionBox => "submission_box",
            BoardKind::Leaderboard => "leaderboard",
        }
    }
}

/// Where a board currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPin {
    #[serde(with = "snowflake")]
    pub channel_id: ChannelId,
    #[serde(with = "snowflake")]
    pub message_id: MessageId,
}
