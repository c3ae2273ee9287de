mod anneal;
mod equalize;
mod randomize;

pub use equalize::{EqualizeOutcome, EqualizeReport};
