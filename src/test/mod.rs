//! Fixtures shared by the unit tests.

use byteorder::{BigEndian, WriteBytesExt};

use crate::geometry::{CoordSeq, Dimension, Geometry, Polygon, PolygonPart, Polyline};
use crate::handler::handler_for;
use crate::header::write_header;
use crate::index::IndexEntry;
use crate::reader::ReaderOptions;
use crate::shape_type::ShapeType;

pub(crate) fn xy(coords: &[(f64, f64)]) -> CoordSeq {
    let mut buf = Vec::with_capacity(coords.len() * 2);
    for (x, y) in coords {
        buf.push(*x);
        buf.push(*y);
    }
    CoordSeq::new(buf, Dimension::XY)
}

/// A polyline with parts `[0, 3]` over 5 points.
pub(crate) fn polyline_two_parts() -> Geometry {
    Geometry::Polyline(Polyline::new(vec![
        xy(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
        xy(&[(5.0, 5.0), (9.0, 9.0)]),
    ]))
}

/// A single closed clockwise unit square.
pub(crate) fn square_polygon() -> Geometry {
    let shell = xy(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
    Geometry::Polygon(Polygon::new(vec![PolygonPart::new(shell, Vec::new())]))
}

/// Encode a whole `.shp` file from geometries, together with the matching
/// index entries.
pub(crate) fn build_shp(
    shape_type: ShapeType,
    shapes: &[Geometry],
) -> (Vec<u8>, Vec<IndexEntry>) {
    let handler = handler_for(shape_type, &ReaderOptions::default()).unwrap();
    let mut records = Vec::new();
    let mut index = Vec::new();
    for (i, shape) in shapes.iter().enumerate() {
        let mut content = Vec::new();
        handler.write(&mut content, shape).unwrap();
        assert_eq!(content.len(), handler.length(shape).unwrap());
        index.push(IndexEntry {
            offset: (100 + records.len()) as u64,
            content_length: content.len(),
        });
        records.write_u32::<BigEndian>(i as u32 + 1).unwrap();
        records.write_i32::<BigEndian>((content.len() / 2) as i32).unwrap();
        records.extend_from_slice(&content);
    }
    let mut bytes = Vec::new();
    write_header(&mut bytes, shape_type, (100 + records.len()) as u64);
    bytes.extend_from_slice(&records);
    (bytes, index)
}
