use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::types::{snowflake, UtcDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter)]
pub enum RunMode {
    #[name = "Solo"]
    Solo,
    #[name = "Team"]
    Team,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[name = "Time"]
    Time,
    #[name = "Damage"]
    Damage,
}

/// Sort key used when a time value can't be parsed. Sorts after every real time.
pub const UNPARSEABLE_TIME: f64 = 9e9;
/// Sort key used when a damage value can't be parsed. Sorts after every real damage.
pub const UNPARSEABLE_DAMAGE: f64 = 0.0;

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Time => "Time",
            Metric::Damage => "Damage",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Metric::Time => "⏱️",
            Metric::Damage => "💥",
        }
    }

    /// Converts a free-text value into a number for ranking.
    ///
    /// Times are colon-separated base-60 groups (`1:02:03.5`, `83.45`), damage is a
    /// number with optional thousands separators (`1,250,000`). Values are never
    /// rejected at entry, so malformed ones fall back to [`UNPARSEABLE_TIME`] and
    /// [`UNPARSEABLE_DAMAGE`].
    pub fn sort_key(&self, value: &str) -> f64 {
        match self {
            Metric::Time => value
                .split(':')
                .try_fold(0.0, |total, part| {
                    part.trim().parse::<f64>().map(|part| total * 60.0 + part)
                })
                .ok()
                .filter(|total: &f64| total.is_finite())
                .unwrap_or(UNPARSEABLE_TIME),

            Metric::Damage => value
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|damage| damage.is_finite())
                .unwrap_or(UNPARSEABLE_DAMAGE),
        }
    }

    /// Whether a lower value is a better run.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Metric::Time)
    }
}

/// A run result as collected from the submitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(with = "snowflake")]
    pub guild_id: GuildId,
    #[serde(with = "snowflake")]
    pub submitter_id: UserId,
    pub mode: RunMode,
    pub size: u8,
    #[serde(with = "snowflake::list")]
    pub players: Vec<UserId>,
    pub metric: Metric,
    pub value: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SubmissionRecord {
    pub fn mode_label(&self) -> String {
        match self.mode {
            RunMode::Solo => "Solo".to_string(),
            RunMode::Team => format!("{}p Team", self.size),
        }
    }
}

/// A record waiting for review. The pending message is the record's only key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    #[serde(flatten)]
    pub record: SubmissionRecord,
    #[serde(with = "snowflake")]
    pub pending_message_id: MessageId,
    #[serde(default, with = "snowflake::optional")]
    pub pending_channel_id: Option<ChannelId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovedRecord {
    #[serde(flatten)]
    pub record: SubmissionRecord,
    #[serde(default, with = "snowflake::optional")]
    pub pending_message_id: Option<MessageId>,
    #[serde(default, with = "snowflake::optional")]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub approved_at: Option<UtcDateTime>,
}

impl ApprovedRecord {
    pub fn from_pending(pending: PendingRecord, approver: UserId, at: UtcDateTime) -> Self {
        ApprovedRecord {
            record: pending.record,
            pending_message_id: Some(pending.pending_message_id),
            approved_by: Some(approver),
            approved_at: Some(at),
        }
    }
}

/// Loads the pending list, dropping entries that never got a pending message.
///
/// Such entries can't be approved or rejected, so keeping them would only break loading.
pub fn deserialize_pending<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<PendingRecord>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PendingRecord>(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Dropping unreadable pending record: {err}");
                None
            }
        })
        .collect())
}
