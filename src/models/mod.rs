mod board;
mod channel;
mod submission;

pub mod types;

pub use board::{BoardKind, BoardPin};
pub use channel::ChannelKey;
pub use submission::{
    deserialize_pending, ApprovedRecord, Metric, PendingRecord, RunMode, SubmissionRecord,
};
