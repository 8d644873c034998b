pub mod snowflake;
mod utc_datetime;

pub use utc_datetime::UtcDateTime;
