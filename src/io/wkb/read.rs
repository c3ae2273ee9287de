//! WKB reading operations.

use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use geo::{Coord, LineString, MultiPolygon, Polygon};

use super::{BUNDLE_MAGIC, BUNDLE_VERSION, WKB_LE, WKB_MULTIPOLYGON, WKB_POLYGON};

/// Byte cursor that tracks the byte order of the geometry being read.
struct WkbReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl<'a> WkbReader<'a> {
    fn new(bytes: &'a [u8]) -> Self { Self { bytes, pos: 0, little_endian: true } }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end)
            .ok_or_else(|| anyhow!("[io::wkb::read] Unexpected end of WKB at byte {}", self.pos))?;
        self.pos = end;
        Ok(slice.try_into()?)
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take::<4>()?;
        Ok(if self.little_endian { u32::from_le_bytes(bytes) } else { u32::from_be_bytes(bytes) })
    }

    fn f64(&mut self) -> Result<f64> {
        let bytes = self.take::<8>()?;
        Ok(if self.little_endian { f64::from_le_bytes(bytes) } else { f64::from_be_bytes(bytes) })
    }

    /// Read a byte-order marker and geometry type.
    fn header(&mut self) -> Result<u32> {
        let [order] = self.take::<1>()?;
        self.little_endian = match order {
            WKB_LE => true,
            0 => false,
            other => bail!("[io::wkb::read] Invalid byte order marker {other}"),
        };
        self.u32()
    }

    fn ring(&mut self) -> Result<LineString<f64>> {
        let len = self.u32()? as usize;
        let mut coords = Vec::with_capacity(len.min(self.bytes.len() / 16));
        for _ in 0..len {
            coords.push(Coord { x: self.f64()?, y: self.f64()? });
        }
        Ok(LineString::from(coords))
    }

    fn polygon_body(&mut self) -> Result<Polygon<f64>> {
        let num_rings = self.u32()?;
        if num_rings == 0 { return Ok(Polygon::new(LineString::new(vec![]), vec![])) }
        let exterior = self.ring()?;
        let interiors = (1..num_rings).map(|_| self.ring()).collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}

/// Decode an ISO WKB MultiPolygon (or a single Polygon) in either byte order.
pub(crate) fn read_multipolygon_wkb(wkb: &[u8]) -> Result<MultiPolygon<f64>> {
    let mut reader = WkbReader::new(wkb);
    match reader.header()? {
        WKB_POLYGON => Ok(MultiPolygon(vec![reader.polygon_body()?])),
        WKB_MULTIPOLYGON => {
            let count = reader.u32()?;
            let mut polygons = Vec::new();
            for i in 0..count {
                let kind = reader.header()?;
                if kind != WKB_POLYGON {
                    bail!("[io::wkb::read] Member {i} of MultiPolygon has geometry type {kind}");
                }
                polygons.push(reader.polygon_body()?);
            }
            Ok(MultiPolygon(polygons))
        }
        other => bail!("[io::wkb::read] Expected Polygon or MultiPolygon geometry type, got {other}"),
    }
}

/// Unpack a district bundle written by `write_district_bundle`.
pub(crate) fn read_district_bundle(bytes: &[u8]) -> Result<Vec<(u32, Vec<u8>)>> {
    if bytes.len() < 10 || &bytes[..4] != BUNDLE_MAGIC {
        bail!("[io::wkb::read] Invalid district WKB file: bad magic bytes");
    }
    if bytes[4] != BUNDLE_VERSION {
        bail!("[io::wkb::read] Unsupported district WKB file version: {}", bytes[4]);
    }
    let count = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;

    let data = if bytes[9] != 0 {
        let mut decompressed = Vec::new();
        GzDecoder::new(&bytes[10..]).read_to_end(&mut decompressed)
            .context("[io::wkb::read] Failed to decompress WKB data")?;
        decompressed
    } else {
        bytes[10..].to_vec()
    };

    let mut reader = WkbReader::new(&data);
    let mut entries = Vec::with_capacity(count.min(data.len() / 8));
    for _ in 0..count {
        let district = reader.u32()?;
        let len = reader.u32()? as usize;
        let end = reader.pos + len;
        let wkb = data.get(reader.pos..end)
            .ok_or_else(|| anyhow!("[io::wkb::read] Truncated entry for district {district}"))?;
        reader.pos = end;
        entries.push((district, wkb.to_vec()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Area};

    use crate::io::wkb::{multipolygon_to_wkb, write_district_bundle};

    use super::*;

    fn frame() -> MultiPolygon<f64> {
        MultiPolygon(vec![
            polygon!(
                exterior: [(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 3.0), (x: 0.0, y: 3.0)],
                interiors: [[(x: 1.0, y: 1.0), (x: 1.0, y: 2.0), (x: 2.0, y: 2.0), (x: 2.0, y: 1.0)]],
            ),
            polygon![(x: 5.0, y: 0.0), (x: 6.0, y: 0.0), (x: 6.0, y: 1.0)],
        ])
    }

    #[test]
    fn decodes_what_is_encoded() {
        let shape = frame();
        let decoded = read_multipolygon_wkb(&multipolygon_to_wkb(&shape)).unwrap();
        assert_eq!(decoded, shape);
        assert!((decoded.unsigned_area() - 8.5).abs() < 1e-12);
    }

    #[test]
    fn reads_big_endian_polygon() {
        let mut wkb = vec![0u8];
        wkb.extend_from_slice(&3u32.to_be_bytes());
        wkb.extend_from_slice(&1u32.to_be_bytes());
        wkb.extend_from_slice(&4u32.to_be_bytes());
        for (x, y) in [(0.0f64, 0.0f64), (2.0, 0.0), (0.0, 2.0), (0.0, 0.0)] {
            wkb.extend_from_slice(&x.to_be_bytes());
            wkb.extend_from_slice(&y.to_be_bytes());
        }
        let shape = read_multipolygon_wkb(&wkb).unwrap();
        assert_eq!(shape.0.len(), 1);
        assert!((shape.unsigned_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_truncated_or_foreign_geometry() {
        let wkb = multipolygon_to_wkb(&frame());
        assert!(read_multipolygon_wkb(&wkb[..wkb.len() - 3]).is_err());

        let mut point = vec![1u8];
        point.extend_from_slice(&1u32.to_le_bytes());
        assert!(read_multipolygon_wkb(&point).is_err());
    }

    #[test]
    fn bundle_survives_compression() {
        let entries = vec![(0, multipolygon_to_wkb(&frame())), (1, vec![])];
        for compress in [false, true] {
            let bundle = write_district_bundle(&entries, compress).unwrap();
            assert_eq!(read_district_bundle(&bundle).unwrap(), entries);
        }
        assert!(read_district_bundle(b"NOPE0000000").is_err());
    }
}
