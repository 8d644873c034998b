//! Embeds posted by the bot.

use indoc::formatdoc;
use poise::serenity_prelude::Mentionable;
use strum::IntoEnumIterator;

use crate::{
    models::{ApprovedRecord, BoardKind, SubmissionRecord},
    platform::{Card, Controls, OutgoingMessage},
    tiers::{Badge, Tier},
    utils::formatting::{format_both, mention_list},
};

/// Prefix of every ephemeral message the bot sends.
pub const BRAND_PREFIX: &str = "[WR BOT]";
pub const THEME_COLOR: u32 = 0x7B68EE;

pub fn branded(message: impl AsRef<str>) -> String {
    format!("{BRAND_PREFIX} {}", message.as_ref())
}

fn record_card(title: &str, record: &SubmissionRecord, submitter_name: &str) -> Card {
    let mut card = Card::new(title, THEME_COLOR)
        .field("Mode", record.mode_label(), true)
        .field(
            "Category",
            format!("{} {}", record.metric.label(), record.metric.icon()),
            true,
        )
        .field(record.metric.label(), &record.value, true)
        .field("Players", mention_list(&record.players), false);

    if let Some(notes) = &record.notes {
        card = card.field("Notes", notes, false);
    }

    card.footer(format!("Submitted by {submitter_name}"))
}

/// The review card posted to the pending channel.
pub fn pending_message(record: &SubmissionRecord, submitter_name: &str) -> OutgoingMessage {
    OutgoingMessage::card(
        record_card("Pending WR", record, submitter_name),
        Controls::ApprovalButtons,
    )
}

/// The finalized card. Has no controls.
pub fn approved_message(approved: &ApprovedRecord, submitter_name: &str) -> OutgoingMessage {
    let mut card = record_card("Approved WR", &approved.record, submitter_name);

    if let Some(approver) = approved.approved_by {
        card = card.field("Approved by", approver.mention().to_string(), true);
    }
    if let Some(at) = approved.approved_at {
        card = card.field("Approved at", format_both(at), true);
    }

    OutgoingMessage::card(card, Controls::None)
}

pub fn rejected_message() -> OutgoingMessage {
    OutgoingMessage::text(branded("❌ Rejected."))
}

pub fn help_message(approval_role: &str) -> OutgoingMessage {
    let tiers = Tier::iter()
        .map(|tier| {
            format!(
                "{} **{}**: {}+ approved runs",
                tier.icon(),
                tier.role_name(),
                tier.threshold()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let badges = Badge::iter()
        .map(|badge| format!("{} {}", badge.icon(), badge.role_name()))
        .collect::<Vec<_>>()
        .join(" · ");

    let description = formatdoc! {"
        ### Commands & UI
        • `/setup-submission-box` — Post the submission UI.
        • `/setup-leaderboard-box` — Post the leaderboard UI.
        • `/setup-help-box` — Post this panel.
        • `/refresh-leaderboard` — Recompute WRs, update roles and refresh the leaderboard.
        • `/wr-top` — Show the best runs of a category.

        ### Flow
        1) Submit via **Submission Box** (Solo/Team).
        2) Reviewed by **{approval_role}** in **#pending-submissions**.
        3) Approved → **#world-records** + leaderboard update.
        4) Post screenshots in **#wr-screenshots** (optional).

        ### Tiers
        {tiers}

        ### Badges
        {badges}"
    };

    OutgoingMessage::card(
        Card::new(BoardKind::Help.marker(), THEME_COLOR)
            .description(description)
            .footer("WR Bot — Command Index"),
        Controls::None,
    )
}

pub fn submission_box_message() -> OutgoingMessage {
    let description = formatdoc! {"
        Use the buttons to submit a run.
        • **Solo**: pick the runner, choose **Time** or **Damage**, enter value, optional **Notes**.
        • **Team**: choose 2p/3p/4p, pick players, choose **Time**/**Damage**, enter value, optional **Notes**."
    };

    OutgoingMessage::card(
        Card::new(BoardKind::SubmissionBox.marker(), THEME_COLOR)
            .description(description)
            .footer("WR Bot · Submissions"),
        Controls::SubmissionButtons,
    )
}
