use strum::EnumIter;

/// The channels the bot works with, looked up by their canonical names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum ChannelKey {
    Pending,
    Records,
    Leaderboard,
    Info,
    Screens,
    Submissions,
}

impl ChannelKey {
    /// The key the channel id is stored under in the guild config.
    pub fn config_key(&self) -> &'static str {
        use ChannelKey::*;

        match self {
            Pending => "pending",
            Records => "records",
            Leaderboard => "leaderboard",
            Info => "info",
            Screens => "screens",
            Submissions => "submissions",
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        use ChannelKey::*;

        match self {
            Pending => "pending-submissions",
            Records => "world-records",
            Leaderboard => "wr-leaderboard",
            Info => "bot-commands-info",
            Screens => "wr-screenshots",
            Submissions => "wr-submissions",
        }
    }
}
