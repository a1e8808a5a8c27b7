use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::decimate::{decimate_line, Resolution};
use crate::error::{Result, ShpError};
use crate::geometry::{BoundingBox, CoordSeq, Dimension, Geometry, Polyline};
use crate::handler::multipoint::write_z_and_measures;
use crate::handler::{effective_dimension, require, write_bbox, ShapeHandler};
use crate::shape_type::ShapeType;

/// Codec for PolyLine and PolyLineZ records.
///
/// Payload layout past the shape-type code: a 32-byte bounding box, the part
/// count, the point count, one part-start index per part, the interleaved
/// x/y block, and for the 3-D kind a z range and one z per point followed by
/// the optional measure block. The last part's point count is the total
/// minus its start index.
#[derive(Debug, Clone, Copy)]
pub struct PolylineHandler {
    dim: Dimension,
    strict: bool,
}

impl PolylineHandler {
    pub fn new(dim: Dimension, strict: bool) -> Self {
        Self { dim, strict }
    }
}

impl ShapeHandler for PolylineHandler {
    fn shape_type(&self) -> ShapeType {
        match self.dim {
            Dimension::XY => ShapeType::PolyLine,
            Dimension::XYZ => ShapeType::PolyLineZ,
        }
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        let lines = read_parts(payload, dim, self.strict, "polyline")?;
        if self.strict {
            for line in &lines {
                if line.len() < 2 {
                    return Err(ShpError::Format(format!(
                        "polyline part with {} points, at least 2 required",
                        line.len()
                    )));
                }
            }
        }
        Ok(Geometry::Polyline(Polyline::new(lines)))
    }

    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()> {
        let polyline = match geometry {
            Geometry::Null => {
                out.write_i32::<LittleEndian>(i32::from(ShapeType::Null))?;
                return Ok(());
            }
            Geometry::Polyline(polyline) => polyline,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot encode {other:?}",
                    self.shape_type()
                )))
            }
        };
        write_parts(out, self.shape_type(), self.dim, polyline.lines())
    }

    fn length(&self, geometry: &Geometry) -> Result<usize> {
        let polyline = match geometry {
            Geometry::Null => return Ok(4),
            Geometry::Polyline(polyline) => polyline,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot measure {other:?}",
                    self.shape_type()
                )))
            }
        };
        Ok(parts_length(
            self.dim,
            polyline.num_lines(),
            polyline.num_points(),
        ))
    }

    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry {
        // A single diagonal part spans the box exactly.
        let mut line = CoordSeq::with_capacity(2, self.dim);
        line.push(bbox.min_x, bbox.min_y, Some(0.0));
        line.push(bbox.max_x, bbox.max_y, Some(0.0));
        Geometry::Polyline(Polyline::new(vec![line]))
    }
}

/// A [`PolylineHandler`] that decimates each part while decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecimatingPolylineHandler {
    inner: PolylineHandler,
    resolution: Resolution,
}

impl DecimatingPolylineHandler {
    pub fn new(dim: Dimension, strict: bool, resolution: Resolution) -> Self {
        Self {
            inner: PolylineHandler::new(dim, strict),
            resolution,
        }
    }
}

impl ShapeHandler for DecimatingPolylineHandler {
    fn shape_type(&self) -> ShapeType {
        self.inner.shape_type()
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        match self.inner.read(payload, declared)? {
            Geometry::Polyline(polyline) => {
                let lines = polyline
                    .lines
                    .into_iter()
                    .map(|line| decimate_line(line, self.resolution))
                    .collect();
                Ok(Geometry::Polyline(Polyline::new(lines)))
            }
            other => Ok(other),
        }
    }

    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()> {
        self.inner.write(out, geometry)
    }

    fn length(&self, geometry: &Geometry) -> Result<usize> {
        self.inner.length(geometry)
    }

    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry {
        self.inner.bbox_geometry(bbox)
    }
}

/// Decode the parts of a polyline or polygon payload into one coordinate
/// sequence per part.
pub(crate) fn read_parts(
    payload: &[u8],
    dim: Dimension,
    strict: bool,
    what: &str,
) -> Result<Vec<CoordSeq>> {
    require(payload, 40, what)?;
    let num_parts = LittleEndian::read_i32(&payload[32..]);
    let num_points = LittleEndian::read_i32(&payload[36..]);
    if num_parts < 0 || num_points < 0 {
        return Err(ShpError::Format(format!(
            "{what} with negative counts ({num_parts} parts, {num_points} points)"
        )));
    }
    let p = num_parts as usize;
    let n = num_points as usize;

    let coords_start = 40 + 4 * p;
    let xy_end = coords_start + 16 * n;
    require(payload, xy_end, what)?;
    let z_values = xy_end + 16;
    if dim == Dimension::XYZ {
        require(payload, z_values + 8 * n, what)?;
        if strict {
            require(payload, z_values + 8 * n + 16 + 8 * n, what)?;
        }
    }

    let mut offsets = Vec::with_capacity(p);
    for i in 0..p {
        let offset = LittleEndian::read_i32(&payload[40 + 4 * i..]);
        if offset < 0 || offset as usize > n {
            return Err(ShpError::Format(format!(
                "{what} part offset {offset} outside its {n} points"
            )));
        }
        if offsets.last().is_some_and(|prev| offset < *prev) {
            return Err(ShpError::Format(format!(
                "{what} part offsets must not decrease"
            )));
        }
        offsets.push(offset);
    }

    let mut parts = Vec::with_capacity(p);
    for i in 0..p {
        let start = offsets[i] as usize;
        let end = offsets.get(i + 1).map_or(n, |next| *next as usize);
        let mut part = CoordSeq::with_capacity(end - start, dim);
        for j in start..end {
            let x = LittleEndian::read_f64(&payload[coords_start + 16 * j..]);
            let y = LittleEndian::read_f64(&payload[coords_start + 16 * j + 8..]);
            let z = match dim {
                Dimension::XY => None,
                Dimension::XYZ => Some(LittleEndian::read_f64(&payload[z_values + 8 * j..])),
            };
            part.push(x, y, z);
        }
        parts.push(part);
    }
    Ok(parts)
}

/// Encode a multi-part payload (shape-type code included).
pub(crate) fn write_parts(
    out: &mut Vec<u8>,
    shape_type: ShapeType,
    dim: Dimension,
    parts: &[CoordSeq],
) -> Result<()> {
    let num_points: usize = parts.iter().map(CoordSeq::len).sum();
    if dim == Dimension::XYZ && parts.iter().any(|part| part.dim() != Dimension::XYZ) {
        return Err(ShpError::Format(format!(
            "cannot encode 2-D parts as {shape_type}"
        )));
    }

    out.write_i32::<LittleEndian>(i32::from(shape_type))?;
    write_bbox(
        out,
        &BoundingBox::from_coords(parts.iter().flat_map(CoordSeq::iter_xy)),
    )?;
    out.write_i32::<LittleEndian>(parts.len() as i32)?;
    out.write_i32::<LittleEndian>(num_points as i32)?;
    let mut offset = 0usize;
    for part in parts {
        out.write_i32::<LittleEndian>(offset as i32)?;
        offset += part.len();
    }
    for part in parts {
        for (x, y) in part.iter_xy() {
            out.write_f64::<LittleEndian>(x)?;
            out.write_f64::<LittleEndian>(y)?;
        }
    }
    if dim == Dimension::XYZ {
        let z_values = parts
            .iter()
            .flat_map(|part| (0..part.len()).map(move |i| part.z(i).unwrap_or(0.0)));
        write_z_and_measures(out, z_values)?;
    }
    Ok(())
}

/// The encoded byte length of a multi-part payload, shape-type code
/// included. Matches [`write_parts`] byte-for-byte.
pub(crate) fn parts_length(dim: Dimension, num_parts: usize, num_points: usize) -> usize {
    let base = 4 + 32 + 4 + 4 + 4 * num_parts + 16 * num_points;
    match dim {
        Dimension::XY => base,
        Dimension::XYZ => base + 2 * (16 + 8 * num_points),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn seq(coords: &[(f64, f64)]) -> CoordSeq {
        let mut buf = Vec::with_capacity(coords.len() * 2);
        for (x, y) in coords {
            buf.push(*x);
            buf.push(*y);
        }
        CoordSeq::new(buf, Dimension::XY)
    }

    #[test]
    fn two_part_record_splits_at_offsets() {
        // Parts [0, 3] over 5 points decode to a 3-point and a 2-point line.
        let geom = Geometry::Polyline(Polyline::new(vec![
            seq(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            seq(&[(5.0, 5.0), (9.0, 9.0)]),
        ]));
        let handler = PolylineHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());

        match handler.read(&buf[4..], ShapeType::PolyLine).unwrap() {
            Geometry::Polyline(polyline) => {
                assert_eq!(polyline.num_lines(), 2);
                assert_eq!(polyline.lines()[0], seq(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
                assert_eq!(polyline.lines()[1], seq(&[(5.0, 5.0), (9.0, 9.0)]));
            }
            other => panic!("expected polyline, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_3d() {
        let line = CoordSeq::new(vec![0.0, 0.0, 1.0, 2.0, 2.0, 3.0, 4.0, 4.0, 5.0], Dimension::XYZ);
        let geom = Geometry::Polyline(Polyline::new(vec![line]));
        let handler = PolylineHandler::new(Dimension::XYZ, true);
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());
        assert_eq!(handler.read(&buf[4..], ShapeType::PolyLineZ).unwrap(), geom);
    }

    #[test]
    fn decimation_applies_per_part() {
        let geom = Geometry::Polyline(Polyline::new(vec![
            seq(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (9.0, 0.0)]),
            seq(&[(0.0, 5.0), (9.0, 5.0)]),
        ]));
        let plain = PolylineHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        plain.write(&mut buf, &geom).unwrap();

        let decimating =
            DecimatingPolylineHandler::new(Dimension::XY, false, Resolution::uniform(1.0));
        match decimating.read(&buf[4..], ShapeType::PolyLine).unwrap() {
            Geometry::Polyline(polyline) => {
                assert_eq!(polyline.lines()[0], seq(&[(0.0, 0.0), (9.0, 0.0)]));
                // the second part is untouched
                assert_eq!(polyline.lines()[1], seq(&[(0.0, 5.0), (9.0, 5.0)]));
            }
            other => panic!("expected polyline, got {other:?}"),
        }
    }

    #[test]
    fn decreasing_part_offsets_are_rejected() {
        let geom = Geometry::Polyline(Polyline::new(vec![
            seq(&[(0.0, 0.0), (1.0, 0.0)]),
            seq(&[(2.0, 0.0), (3.0, 0.0)]),
        ]));
        let handler = PolylineHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        // corrupt the second part offset (first offset is at byte 44)
        buf[48..52].copy_from_slice(&1i32.to_le_bytes());
        buf[44..48].copy_from_slice(&3i32.to_le_bytes());
        assert!(matches!(
            handler.read(&buf[4..], ShapeType::PolyLine),
            Err(ShpError::Format(_))
        ));
    }

    #[test]
    fn strict_mode_rejects_degenerate_parts() {
        let geom = Geometry::Polyline(Polyline::new(vec![seq(&[(1.0, 1.0)])]));
        let mut buf = Vec::new();
        PolylineHandler::new(Dimension::XY, false)
            .write(&mut buf, &geom)
            .unwrap();

        let lenient = PolylineHandler::new(Dimension::XY, false);
        assert!(lenient.read(&buf[4..], ShapeType::PolyLine).is_ok());
        let strict = PolylineHandler::new(Dimension::XY, true);
        assert!(matches!(
            strict.read(&buf[4..], ShapeType::PolyLine),
            Err(ShpError::Format(_))
        ));
    }

    #[test]
    fn truncated_coordinate_block_is_fatal() {
        let geom = Geometry::Polyline(Polyline::new(vec![seq(&[(0.0, 0.0), (1.0, 1.0)])]));
        let handler = PolylineHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        buf.truncate(buf.len() - 8);
        assert!(matches!(
            handler.read(&buf[4..], ShapeType::PolyLine),
            Err(ShpError::Truncated(_))
        ));
    }

    #[test]
    fn bbox_geometry_spans_the_box() {
        let handler = PolylineHandler::new(Dimension::XY, false);
        let bbox = BoundingBox::new(-2.0, -3.0, 4.0, 5.0);
        match handler.bbox_geometry(&bbox) {
            Geometry::Polyline(polyline) => {
                assert_eq!(polyline.num_lines(), 1);
                let computed = BoundingBox::from_coords(polyline.lines()[0].iter_xy());
                assert_eq!(computed, bbox);
            }
            other => panic!("expected polyline, got {other:?}"),
        }
    }
}
