mod io;
mod plan;

pub use io::SvgLayer;
pub use plan::Plan;
