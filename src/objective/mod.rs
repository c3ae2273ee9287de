mod metric;
mod objective;

pub use metric::Metric;
pub use objective::Objective;
