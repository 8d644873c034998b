use std::{
    cmp::Reverse,
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use poise::serenity_prelude::{GuildId, Mentionable, UserId};
use tracing::warn;

use crate::{
    boards::{BoardError, BoardPublisher, BoardUpdate},
    cards::THEME_COLOR,
    models::{ApprovedRecord, BoardKind},
    platform::{Card, Controls, OutgoingMessage, Platform},
    repository::{RepositoryError, SubmissionRepository},
    tiers::{tier_for, Tier},
};

pub const MAX_ROWS: usize = 50;
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// A player's line on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    pub user: UserId,
    /// `None` if the player couldn't be resolved.
    pub name: Option<String>,
    pub count: u32,
    pub tier: Option<Tier>,
}

impl Standing {
    fn sort_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_lowercase(),
            None => self.user.to_string(),
        }
    }

    fn display(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.user.mention().to_string(),
        }
    }
}

/// Number of approved runs each player took part in.
pub fn count_runs(approved: &[ApprovedRecord]) -> HashMap<UserId, u32> {
    let mut counts = HashMap::new();

    for approved in approved {
        let players: BTreeSet<UserId> = approved.record.players.iter().copied().collect();
        for player in players {
            *counts.entry(player).or_insert(0) += 1;
        }
    }

    counts
}

/// Orders players by run count, most first. Ties are broken by case-insensitive name.
pub fn rank(counts: &HashMap<UserId, u32>, names: &HashMap<UserId, String>) -> Vec<Standing> {
    let mut standings: Vec<Standing> = counts
        .iter()
        .map(|(user, count)| Standing {
            user: *user,
            name: names.get(user).cloned(),
            count: *count,
            tier: tier_for(*count),
        })
        .collect();

    standings.sort_by_cached_key(|standing| (Reverse(standing.count), standing.sort_name()));
    standings
}

pub fn render(standings: &[Standing]) -> Card {
    let lines: Vec<String> = standings
        .iter()
        .take(MAX_ROWS)
        .enumerate()
        .map(|(index, standing)| {
            let position = match MEDALS.get(index) {
                Some(medal) => medal.to_string(),
                None => format!("{}.", index + 1),
            };

            let mut line = format!(
                "{position} **{}** — {} WRs",
                standing.display(),
                standing.count
            );
            if let Some(tier) = standing.tier {
                line.push_str(&format!(" · *{}*", tier.role_name()));
            }
            line
        })
        .collect();

    let description = if lines.is_empty() {
        "_No world records yet._".to_string()
    } else {
        lines.join("\n")
    };

    // Takes the color of the leader's tier.
    let color = standings
        .first()
        .and_then(|leader| leader.tier)
        .map(|tier| tier.color())
        .unwrap_or(THEME_COLOR);

    Card::new(BoardKind::Leaderboard.marker(), color)
        .description(description)
        .footer("WR Bot · Leaderboard")
}

/// Computes standings from the approved runs and keeps the leaderboard board current.
#[derive(Clone)]
pub struct Leaderboard {
    submissions: SubmissionRepository,
    platform: Arc<dyn Platform>,
    publisher: BoardPublisher,
}

impl Leaderboard {
    pub fn new(
        submissions: SubmissionRepository,
        platform: Arc<dyn Platform>,
        publisher: BoardPublisher,
    ) -> Leaderboard {
        Leaderboard {
            submissions,
            platform,
            publisher,
        }
    }

    pub async fn standings(&self, guild: GuildId) -> Result<Vec<Standing>, RepositoryError> {
        let approved = self.submissions.approved_in_guild(guild).await?;
        let counts = count_runs(&approved);

        let mut names = HashMap::new();
        for user in counts.keys() {
            match self.platform.display_name(guild, *user).await {
                Ok(Some(name)) => {
                    names.insert(*user, name);
                }
                Ok(None) => {}
                Err(err) => warn!("Could not resolve the name of {user}: {err}"),
            }
        }

        Ok(rank(&counts, &names))
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self, guild: GuildId) -> Result<BoardUpdate, BoardError> {
        let standings = self.standings(guild).await?;

        self.publisher
            .publish(
                guild,
                BoardKind::Leaderboard,
                OutgoingMessage::card(render(&standings), Controls::LeaderboardRefresh),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use map_macro::hash_map;
    use poise::serenity_prelude::{GuildId, UserId};

    use crate::{
        models::{ApprovedRecord, Metric, RunMode, SubmissionRecord},
        tiers::Tier,
    };

    use super::*;

    fn approved(players: &[u64]) -> ApprovedRecord {
        ApprovedRecord {
            record: SubmissionRecord {
                guild_id: GuildId::new(1),
                submitter_id: UserId::new(players[0]),
                mode: if players.len() == 1 {
                    RunMode::Solo
                } else {
                    RunMode::Team
                },
                size: players.len() as u8,
                players: players.iter().copied().map(UserId::new).collect(),
                metric: Metric::Time,
                value: "1:00".to_string(),
                notes: None,
            },
            pending_message_id: None,
            approved_by: None,
            approved_at: None,
        }
    }

    #[test]
    fn counts_every_run_a_player_is_in() {
        let counts = count_runs(&[approved(&[1]), approved(&[1, 2]), approved(&[2, 3])]);

        assert_eq!(
            counts,
            hash_map! {
                UserId::new(1) => 2,
                UserId::new(2) => 2,
                UserId::new(3) => 1,
            }
        );
    }

    #[test]
    fn duplicate_players_in_one_run_count_once() {
        let counts = count_runs(&[approved(&[4, 4])]);
        assert_eq!(counts, hash_map! { UserId::new(4) => 1 });
    }

    #[test]
    fn ties_are_ordered_by_case_insensitive_name() {
        let counts = hash_map! {
            UserId::new(1) => 2,
            UserId::new(2) => 2,
            UserId::new(3) => 5,
            UserId::new(4) => 2,
        };
        let names = hash_map! {
            UserId::new(1) => "bravo".to_string(),
            UserId::new(2) => "Alpha".to_string(),
            UserId::new(3) => "zulu".to_string(),
            UserId::new(4) => "Charlie".to_string(),
        };

        let order: Vec<u64> = rank(&counts, &names)
            .iter()
            .map(|standing| standing.user.get())
            .collect();

        assert_eq!(order, vec![3, 2, 1, 4]);
    }

    #[test]
    fn unresolved_players_sort_by_raw_id() {
        let counts = hash_map! {
            UserId::new(9) => 1,
            UserId::new(500) => 1,
        };
        let names = hash_map! { UserId::new(9) => "Zed".to_string() };

        let standings = rank(&counts, &names);

        // "500" sorts before "zed".
        assert_eq!(standings[0].user, UserId::new(500));
        assert_eq!(standings[0].name, None);
        assert_eq!(standings[1].tier, Some(Tier::Novice));
    }

    #[test]
    fn renders_medals_and_tiers() {
        let counts = hash_map! {
            UserId::new(1) => 4,
            UserId::new(2) => 3,
            UserId::new(3) => 2,
            UserId::new(4) => 1,
        };
        let names = hash_map! {
            UserId::new(1) => "Ann".to_string(),
            UserId::new(2) => "Bob".to_string(),
            UserId::new(3) => "Cid".to_string(),
        };

        let card = render(&rank(&counts, &names));

        assert_eq!(card.title, "[WR LEADERBOARD]");
        assert_eq!(card.color, Tier::Elite.color());
        assert_eq!(
            card.description.as_deref(),
            Some(
                "🥇 **Ann** — 4 WRs · *WR Elite*\n\
                 🥈 **Bob** — 3 WRs · *WR Pro*\n\
                 🥉 **Cid** — 2 WRs · *WR Challenger*\n\
                 4. **<@4>** — 1 WRs · *WR Novice*"
            )
        );
    }

    #[test]
    fn empty_board_says_so() {
        let card = render(&[]);
        assert_eq!(card.description.as_deref(), Some("_No world records yet._"));
        assert_eq!(card.color, THEME_COLOR);
    }

    #[test]
    fn rows_are_capped() {
        let counts: HashMap<UserId, u32> = (1..=60).map(|id| (UserId::new(id), 1)).collect();
        let card = render(&rank(&counts, &HashMap::new()));

        assert_eq!(card.description.unwrap().lines().count(), MAX_ROWS);
    }
}
