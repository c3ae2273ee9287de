#![doc = "OpenMander districting engine: contiguous partitions of a spatial unit graph, \
scored by weighted metrics and improved by equalization and multi-phase annealing."]
mod anneal;
mod error;
mod geom;
mod graph;
mod io;
mod map;
mod objective;
mod partition;
mod plan;

#[doc(inline)]
pub use anneal::{AnnealConfig, AnnealReport, PhaseConfig, PhaseReport, Progress, ProgressRecord, Stage, StopReason};

#[doc(inline)]
pub use error::{PlanError, Result};

#[doc(inline)]
pub use map::{UnitGraph, AREA_SERIES, PERIMETER_SERIES};

#[doc(inline)]
pub use objective::{Metric, Objective};

#[doc(inline)]
pub use partition::{EqualizeOutcome, EqualizeReport, Infeasible, MoveOutcome};

#[doc(inline)]
pub use plan::{Plan, SvgLayer};
