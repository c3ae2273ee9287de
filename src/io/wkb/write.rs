//! WKB writing operations.

use std::io::Write;

use anyhow::{Context, Result};
use flate2::{write::GzEncoder, Compression};
use geo::{LineString, MultiPolygon};

use super::{BUNDLE_MAGIC, BUNDLE_VERSION, WKB_LE, WKB_MULTIPOLYGON, WKB_POLYGON};

fn write_ring(wkb: &mut Vec<u8>, ring: &LineString<f64>) {
    wkb.extend_from_slice(&(ring.0.len() as u32).to_le_bytes());
    for coord in ring.coords() {
        wkb.extend_from_slice(&coord.x.to_le_bytes());
        wkb.extend_from_slice(&coord.y.to_le_bytes());
    }
}

/// Encode a MultiPolygon as ISO WKB, little endian. Rings are written closed, as stored.
pub(crate) fn multipolygon_to_wkb(shape: &MultiPolygon<f64>) -> Vec<u8> {
    let mut wkb = Vec::new();
    wkb.push(WKB_LE);
    wkb.extend_from_slice(&WKB_MULTIPOLYGON.to_le_bytes());
    wkb.extend_from_slice(&(shape.0.len() as u32).to_le_bytes());

    for polygon in shape {
        wkb.push(WKB_LE);
        wkb.extend_from_slice(&WKB_POLYGON.to_le_bytes());
        wkb.extend_from_slice(&(1 + polygon.interiors().len() as u32).to_le_bytes());
        write_ring(&mut wkb, polygon.exterior());
        polygon.interiors().iter().for_each(|ring| write_ring(&mut wkb, ring));
    }
    wkb
}

/// Pack `(district, wkb)` entries into a single bundle, optionally gzipping the entry block.
pub(crate) fn write_district_bundle(entries: &[(u32, Vec<u8>)], compress: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(BUNDLE_MAGIC);
    out.push(BUNDLE_VERSION);
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    out.push(u8::from(compress));

    let mut data = Vec::new();
    for (district, wkb) in entries {
        data.extend_from_slice(&district.to_le_bytes());
        data.extend_from_slice(&(wkb.len() as u32).to_le_bytes());
        data.extend_from_slice(wkb);
    }

    if compress {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)
            .context("[io::wkb::write] Failed to compress WKB data")?;
        let compressed = encoder.finish()
            .context("[io::wkb::write] Failed to finish compression")?;
        out.extend_from_slice(&compressed);
    } else {
        out.extend_from_slice(&data);
    }
    Ok(out)
}
