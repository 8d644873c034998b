use std::fmt::Display;

use time::OffsetDateTime;

/// Rendering styles of Discord's `<t:...>` markup. Every viewer sees it in their own
/// time zone.
pub enum TimestampStyle {
    /// Relative time, e.g. `2 months ago`
    RelativeTime,
}

impl Display for TimestampStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self {
            TimestampStyle::RelativeTime => "R",
        };
        write!(f, "{suffix}")
    }
}

pub fn timestamp(datetime: impl Into<OffsetDateTime>, style: TimestampStyle) -> String {
    let unix_timestamp = datetime.into().unix_timestamp();
    format!("<t:{unix_timestamp}:{style}>")
}
