mod algorithm;
mod contiguity;
mod metrics;
mod ops;
mod partition;
mod structures;

pub use algorithm::{EqualizeOutcome, EqualizeReport};
pub use ops::{Infeasible, MoveOutcome};
pub(crate) use partition::Partition;
