//! Serde helpers that store Discord ids as plain JSON integers.
//!
//! Use with `#[serde(with = "...")]` on id fields, `Option` id fields, and id lists.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An id type that converts to and from its raw snowflake.
pub trait Snowflake: Copy {
    fn to_raw(self) -> u64;
    fn from_raw(raw: u64) -> Self;
}

macro_rules! impl_snowflake {
    ($($id:ty),* $(,)?) => {
        $(
            impl Snowflake for $id {
                fn to_raw(self) -> u64 {
                    self.get()
                }

                fn from_raw(raw: u64) -> Self {
                    <$id>::new(raw)
                }
            }
        )*
    };
}

impl_snowflake!(
    poise::serenity_prelude::GuildId,
    poise::serenity_prelude::ChannelId,
    poise::serenity_prelude::MessageId,
    poise::serenity_prelude::UserId,
    poise::serenity_prelude::RoleId,
);

pub fn serialize<T: Snowflake, S: Serializer>(id: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(id.to_raw())
}

pub fn deserialize<'de, T: Snowflake, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    let raw = u64::deserialize(deserializer)?;
    if raw == 0 {
        return Err(serde::de::Error::custom("snowflake id must be non-zero"));
    }
    Ok(T::from_raw(raw))
}

pub mod optional {
    use super::*;

    pub fn serialize<T: Snowflake, S: Serializer>(
        id: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        id.map(Snowflake::to_raw).serialize(serializer)
    }

    pub fn deserialize<'de, T: Snowflake, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        let raw = Option::<u64>::deserialize(deserializer)?;
        Ok(raw.filter(|raw| *raw != 0).map(T::from_raw))
    }
}

pub mod list {
    use super::*;

    pub fn serialize<T: Snowflake, S: Serializer>(
        ids: &[T],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ids.iter().map(|id| id.to_raw()))
    }

    pub fn deserialize<'de, T: Snowflake, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<T>, D::Error> {
        let raw = Vec::<u64>::deserialize(deserializer)?;
        if raw.contains(&0) {
            return Err(serde::de::Error::custom("snowflake id must be non-zero"));
        }
        Ok(raw.into_iter().map(T::from_raw).collect())
    }
}
