//! Format-specific writers and readers, organized by format rather than domain.
//!
//! - `csv` - plan assignments as `geo_id,district` rows
//! - `svg` - district map rendering
//! - `wkb` - Well-Known Binary district geometry and the district bundle file

pub(crate) mod csv;
pub(crate) mod svg;
pub(crate) mod wkb;
