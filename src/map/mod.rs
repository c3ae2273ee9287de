mod unit_graph;

pub use unit_graph::{UnitGraph, AREA_SERIES, PERIMETER_SERIES};
