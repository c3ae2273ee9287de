//! ISO Well-Known Binary encoding for district geometry, plus the `OMDW` bundle
//! that stores one blob per district in a single file.
//!
//! Bundle layout: magic `OMDW`, version byte, entry count (u32 LE), compression
//! flag byte, then `(district u32 LE, length u32 LE, wkb)` entries, gzipped as a
//! block when the flag is set.

mod read;
mod write;

pub(crate) use read::{read_district_bundle, read_multipolygon_wkb};
pub(crate) use write::{multipolygon_to_wkb, write_district_bundle};

/// WKB geometry type for Polygon
const WKB_POLYGON: u32 = 3;
/// WKB geometry type for MultiPolygon
const WKB_MULTIPOLYGON: u32 = 6;
/// WKB byte order: little endian
const WKB_LE: u8 = 1;

/// Magic bytes for the district bundle: "OMDW" (OpenMander District WKB)
const BUNDLE_MAGIC: &[u8] = b"OMDW";
/// Format version (currently 1)
const BUNDLE_VERSION: u8 = 1;
