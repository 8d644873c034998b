//! Interactive collection of a run submission.

mod driver;
mod state;

pub use driver::FlowDriver;
pub use state::{
    AbortReason, FlowError, FlowInput, FlowState, SubmissionFlow, SELECT_TIMEOUT, TEAM_SIZES,
    TEXT_TIMEOUT,
};
