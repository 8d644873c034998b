use std::cmp::Ordering;

use crate::{
    cards::THEME_COLOR,
    models::{ApprovedRecord, Metric, RunMode},
    platform::Card,
    utils::formatting::mention_list,
};

pub const TOP_RUNS: usize = 10;

/// The approved runs of one category, best first.
///
/// Times rank ascending and damage descending. Values that don't parse sort last.
pub fn best_runs<'a>(
    approved: &'a [ApprovedRecord],
    metric: Metric,
    mode: RunMode,
    size: u8,
) -> Vec<&'a ApprovedRecord> {
    let mut runs: Vec<(f64, &ApprovedRecord)> = approved
        .iter()
        .filter(|approved| {
            let record = &approved.record;
            record.metric == metric && record.mode == mode && record.size == size
        })
        .map(|approved| (metric.sort_key(&approved.record.value), approved))
        .collect();

    runs.sort_by(|(a, _), (b, _)| {
        let ordering = a.partial_cmp(b).unwrap_or(Ordering::Equal);
        if metric.lower_is_better() {
            ordering
        } else {
            ordering.reverse()
        }
    });

    runs.into_iter().map(|(_, approved)| approved).collect()
}

pub fn render_top(runs: &[&ApprovedRecord], metric: Metric, mode: RunMode, size: u8) -> Card {
    let category = match mode {
        RunMode::Solo => "Solo".to_string(),
        RunMode::Team => format!("{size}p Team"),
    };
    let title = format!("Top {} · {category} {}", metric.label(), metric.icon());

    let description = if runs.is_empty() {
        "_No approved runs in this category yet._".to_string()
    } else {
        runs.iter()
            .take(TOP_RUNS)
            .enumerate()
            .map(|(index, approved)| {
                format!(
                    "{}. **{}** · {}",
                    index + 1,
                    approved.record.value,
                    mention_list(&approved.record.players)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    Card::new(title, THEME_COLOR).description(description)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{GuildId, UserId};

    use crate::models::{ApprovedRecord, Metric, RunMode, SubmissionRecord};

    use super::{best_runs, render_top};

    fn run(mode: RunMode, size: u8, metric: Metric, value: &str) -> ApprovedRecord {
        ApprovedRecord {
            record: SubmissionRecord {
                guild_id: GuildId::new(1),
                submitter_id: UserId::new(1),
                mode,
                size,
                players: (1..=size as u64).map(UserId::new).collect(),
                metric,
                value: value.to_string(),
                notes: None,
            },
            pending_message_id: None,
            approved_by: None,
            approved_at: None,
        }
    }

    fn values(runs: &[&ApprovedRecord]) -> Vec<String> {
        runs.iter().map(|run| run.record.value.clone()).collect()
    }

    #[test]
    fn fastest_time_first_and_garbage_last() {
        let approved = vec![
            run(RunMode::Solo, 1, Metric::Time, "2:00"),
            run(RunMode::Solo, 1, Metric::Time, "soon"),
            run(RunMode::Solo, 1, Metric::Time, "1:23.45"),
            run(RunMode::Solo, 1, Metric::Damage, "1"),
        ];

        let best = best_runs(&approved, Metric::Time, RunMode::Solo, 1);

        assert_eq!(values(&best), vec!["1:23.45", "2:00", "soon"]);
    }

    #[test]
    fn highest_damage_first() {
        let approved = vec![
            run(RunMode::Team, 2, Metric::Damage, "900"),
            run(RunMode::Team, 2, Metric::Damage, "1,200"),
            run(RunMode::Team, 3, Metric::Damage, "5,000"),
            run(RunMode::Team, 2, Metric::Damage, "n/a"),
        ];

        let best = best_runs(&approved, Metric::Damage, RunMode::Team, 2);

        assert_eq!(values(&best), vec!["1,200", "900", "n/a"]);
    }

    #[test]
    fn renders_category_title() {
        let approved = vec![run(RunMode::Team, 2, Metric::Time, "3:00")];
        let best = best_runs(&approved, Metric::Time, RunMode::Team, 2);

        let card = render_top(&best, Metric::Time, RunMode::Team, 2);

        assert_eq!(card.title, "Top Time · 2p Team ⏱️");
        assert_eq!(card.description.as_deref(), Some("1. **3:00** · <@1>, <@2>"));
    }
}
