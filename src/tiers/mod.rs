use strum::{EnumIter, IntoEnumIterator};

/// Prestige tiers, from the lowest to the highest.
///
/// A player holds at most one tier role at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Tier {
    Novice,
    Challenger,
    Pro,
    Elite,
}

impl Tier {
    /// The number of approved runs required for this tier.
    pub fn threshold(&self) -> u32 {
        use Tier::*;

        match self {
            Novice => 1,
            Challenger => 2,
            Pro => 3,
            Elite => 4,
        }
    }

    /// The name of the guild role representing this tier.
    pub fn role_name(&self) -> &'static str {
        use Tier::*;

        match self {
            Novice => "WR Novice",
            Challenger => "WR Challenger",
            Pro => "WR Pro",
            Elite => "WR Elite",
        }
    }

    pub fn color(&self) -> u32 {
        use Tier::*;

        match self {
            Novice => 0x7C7C7C,
            Challenger => 0x3BA55D,
            Pro => 0x5865F2,
            Elite => 0xFEE75C,
        }
    }

    pub fn icon(&self) -> &'static str {
        use Tier::*;

        match self {
            Novice => "🎖️",
            Challenger => "🏅",
            Pro => "💠",
            Elite => "👑",
        }
    }

    pub fn is_tier_role(role_name: &str) -> bool {
        Tier::iter().any(|tier| tier.role_name() == role_name)
    }
}

/// Returns the highest tier whose threshold is reached by `count`.
pub fn tier_for(count: u32) -> Option<Tier> {
    // The ladder is walked to the end: the last satisfied threshold wins.
    let mut highest = None;
    for tier in Tier::iter() {
        if count >= tier.threshold() {
            highest = Some(tier);
        }
    }
    highest
}

/// Stackable badges shown next to the tiers.
///
/// Membership is a static flag per player. It's not derived from approved runs and
/// role synchronization never touches badge roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Badge {
    Solo,
    Team,
    Time,
    Damage,
}

impl Badge {
    pub fn role_name(&self) -> &'static str {
        use Badge::*;

        match self {
            Solo => "Abyssal Soloist",
            Team => "Abyssal Team Player",
            Time => "Abyssal Speedrunner",
            Damage => "Abyssal Damage Dealer",
        }
    }

    pub fn icon(&self) -> &'static str {
        use Badge::*;

        match self {
            Solo => "🧍",
            Team => "🧑‍🤝‍🧑",
            Time => "⏱️",
            Damage => "💥",
        }
    }
}
