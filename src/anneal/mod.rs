//! Configuration, progress and reporting types for multi-phase simulated annealing.
//!
//! The search itself runs on the partition; see `Plan::anneal`.

mod config;
mod progress;
mod report;

pub use config::{AnnealConfig, PhaseConfig};
pub use progress::{Progress, ProgressRecord, Stage, StopReason};
pub use report::{AnnealReport, PhaseReport};
