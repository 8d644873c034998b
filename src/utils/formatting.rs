use poise::serenity_prelude::{Mentionable, UserId};
use time::macros::format_description;
use time::{format_description, OffsetDateTime};

use super::{timestamp, TimestampStyle};

const DATETIME_FORMAT: &[format_description::FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

pub fn format_utc(date_time: impl Into<OffsetDateTime>) -> String {
    let offset_date_time: OffsetDateTime = date_time.into();
    offset_date_time
        .format(DATETIME_FORMAT)
        .unwrap_or_else(|_| offset_date_time.unix_timestamp().to_string())
}

/// UTC for the logs and the viewer's local time for everyone else.
pub fn format_both(date_time: impl Into<OffsetDateTime>) -> String {
    let date_time = date_time.into();
    format!(
        "{} UTC ({})",
        format_utc(date_time),
        timestamp(date_time, TimestampStyle::RelativeTime)
    )
}

pub fn mention_list(users: &[UserId]) -> String {
    users
        .iter()
        .map(|user| user.mention().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::UserId;
    use time::macros::datetime;

    use super::{format_both, format_utc, mention_list};

    #[test]
    fn formats_minutes_in_utc() {
        assert_eq!(format_utc(datetime!(2024-01-05 07:08:09 UTC)), "2024-01-05 07:08");
    }

    #[test]
    fn both_formats_include_relative_markup() {
        assert_eq!(
            format_both(datetime!(2021-04-20 16:20 UTC)),
            "2021-04-20 16:20 UTC (<t:1618935600:R>)"
        );
    }

    #[test]
    fn mentions_are_comma_separated() {
        assert_eq!(
            mention_list(&[UserId::new(1), UserId::new(22)]),
            "<@1>, <@22>"
        );
    }
}
