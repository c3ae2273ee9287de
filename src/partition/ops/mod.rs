mod flip;

pub use flip::{Infeasible, MoveOutcome};
