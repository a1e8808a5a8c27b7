//! Per-kind codecs for record payloads.
//!
//! One [`ShapeHandler`] exists per geometry kind; the registry picks the
//! implementation from the file-level shape type at open time. Handlers
//! never own the byte buffer: `read` borrows a payload slice for the
//! duration of one decode call.

mod multipoint;
mod point;
mod polygon;
mod polyline;

pub use multipoint::{DecimatingMultiPointHandler, MultiPointHandler};
pub use point::PointHandler;
pub use polygon::{DecimatingPolygonHandler, PolygonHandler};
pub use polyline::{DecimatingPolylineHandler, PolylineHandler};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{Result, ShpError};
use crate::geometry::{BoundingBox, Dimension, Geometry};
use crate::reader::ReaderOptions;
use crate::shape_type::ShapeType;

/// Decodes and encodes the payload of a single record.
///
/// `read` is handed the payload positioned immediately after the record's
/// shape-type code, which the reader has already consumed and validated.
/// `write` emits the full record content starting at the shape-type code,
/// and `length` reports exactly how many bytes `write` will produce.
pub trait ShapeHandler {
    /// The kind this handler decodes.
    fn shape_type(&self) -> ShapeType;

    /// Decode one record payload. A `declared` type of [`ShapeType::Null`]
    /// yields [`Geometry::Null`]; a declared type incompatible with this
    /// handler's kind is a [`ShpError::Format`].
    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry>;

    /// Encode a geometry as record content (shape-type code included).
    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()>;

    /// The exact byte length `write` would emit for this geometry.
    fn length(&self, geometry: &Geometry) -> Result<usize>;

    /// A minimal geometry that is merely bounding-box-accurate, for callers
    /// that need a coarse preview without a full decode.
    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry;
}

/// Map the file-level shape type to its handler, honoring the reader's
/// decimation and strictness options.
pub fn handler_for(
    shape_type: ShapeType,
    options: &ReaderOptions,
) -> Result<Box<dyn ShapeHandler>> {
    let dim = shape_type.dimension();
    let strict = options.strict;
    Ok(match (shape_type.base(), options.decimation) {
        (ShapeType::Null, _) => Box::new(NullHandler),
        (ShapeType::Point, _) => Box::new(PointHandler::new(dim, strict)),
        (ShapeType::MultiPoint, None) => Box::new(MultiPointHandler::new(dim, strict)),
        (ShapeType::MultiPoint, Some(res)) => {
            Box::new(DecimatingMultiPointHandler::new(dim, strict, res))
        }
        (ShapeType::PolyLine, None) => Box::new(PolylineHandler::new(dim, strict)),
        (ShapeType::PolyLine, Some(res)) => {
            Box::new(DecimatingPolylineHandler::new(dim, strict, res))
        }
        (ShapeType::Polygon, None) => Box::new(PolygonHandler::new(dim, strict)),
        (ShapeType::Polygon, Some(res)) => {
            Box::new(DecimatingPolygonHandler::new(dim, strict, res))
        }
        // base() only returns the five base kinds
        _ => unreachable!(),
    })
}

/// Handler for files whose declared type is Null: every record decodes to
/// the empty-geometry sentinel.
#[derive(Debug, Clone, Copy)]
pub struct NullHandler;

impl ShapeHandler for NullHandler {
    fn shape_type(&self) -> ShapeType {
        ShapeType::Null
    }

    fn read(&self, _payload: &[u8], _declared: ShapeType) -> Result<Geometry> {
        Ok(Geometry::Null)
    }

    fn write(&self, out: &mut Vec<u8>, _geometry: &Geometry) -> Result<()> {
        out.write_i32::<LittleEndian>(i32::from(ShapeType::Null))?;
        Ok(())
    }

    fn length(&self, _geometry: &Geometry) -> Result<usize> {
        Ok(4)
    }

    fn bbox_geometry(&self, _bbox: &BoundingBox) -> Geometry {
        Geometry::Null
    }
}

/// Resolve the effective decode dimensionality for a record, or `None` for a
/// Null record. A 3-D handler handed the matching 2-D code falls back to 2-D
/// decoding; a 2-D handler never reads a z block even from a 3-D code.
pub(crate) fn effective_dimension(
    handler_type: ShapeType,
    declared: ShapeType,
) -> Result<Option<Dimension>> {
    if declared == ShapeType::Null {
        return Ok(None);
    }
    if declared.base() != handler_type.base() {
        return Err(ShpError::Format(format!(
            "cannot decode a {declared} record with the {handler_type} handler"
        )));
    }
    let dim = match handler_type.dimension() {
        Dimension::XY => Dimension::XY,
        Dimension::XYZ => declared.dimension(),
    };
    Ok(Some(dim))
}

/// Fail with [`ShpError::Truncated`] unless at least `needed` bytes are
/// available.
pub(crate) fn require(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.len() < needed {
        Err(ShpError::Truncated(format!(
            "{what} needs {needed} bytes, {} available",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

/// Read the 32-byte bounding box at `offset`. The caller has validated the
/// length.
pub(crate) fn read_bbox(buf: &[u8], offset: usize) -> BoundingBox {
    BoundingBox::new(
        LittleEndian::read_f64(&buf[offset..]),
        LittleEndian::read_f64(&buf[offset + 8..]),
        LittleEndian::read_f64(&buf[offset + 16..]),
        LittleEndian::read_f64(&buf[offset + 24..]),
    )
}

pub(crate) fn write_bbox(out: &mut Vec<u8>, bbox: &BoundingBox) -> Result<()> {
    out.write_f64::<LittleEndian>(bbox.min_x)?;
    out.write_f64::<LittleEndian>(bbox.min_y)?;
    out.write_f64::<LittleEndian>(bbox.max_x)?;
    out.write_f64::<LittleEndian>(bbox.max_y)?;
    Ok(())
}

/// The min/max of an ordinate block, or the zero range when empty.
pub(crate) fn ordinate_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut range: Option<(f64, f64)> = None;
    for v in values {
        match &mut range {
            None => range = Some((v, v)),
            Some((min, max)) => {
                *min = min.min(v);
                *max = max.max(v);
            }
        }
    }
    range.unwrap_or((0.0, 0.0))
}
