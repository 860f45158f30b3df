//! # Submitted work and its result slot.
//!
//! - `Job` - a type-erased pending submission owned by the wait queue
//! - [`TaskHandle`] - the submitter's future over the job's result slot

mod handle;
mod job;

pub use handle::TaskHandle;
pub(crate) use job::{Finished, Job};
