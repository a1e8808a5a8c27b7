use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{Result, ShpError};
use crate::geometry::{BoundingBox, Dimension, Geometry, Point};
use crate::handler::{effective_dimension, require, ShapeHandler};
use crate::shape_type::ShapeType;

/// Codec for Point and PointZ records.
///
/// Payload layout past the shape-type code: x and y as little-endian
/// doubles, then for the 3-D kind a z ordinate and a measure. Some files in
/// the wild omit the measure; `strict` turns that omission into an error.
#[derive(Debug, Clone, Copy)]
pub struct PointHandler {
    dim: Dimension,
    strict: bool,
}

impl PointHandler {
    pub fn new(dim: Dimension, strict: bool) -> Self {
        Self { dim, strict }
    }
}

impl ShapeHandler for PointHandler {
    fn shape_type(&self) -> ShapeType {
        match self.dim {
            Dimension::XY => ShapeType::Point,
            Dimension::XYZ => ShapeType::PointZ,
        }
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        require(payload, 16, "point coordinate")?;
        let x = LittleEndian::read_f64(&payload[0..]);
        let y = LittleEndian::read_f64(&payload[8..]);
        let point = match dim {
            Dimension::XY => Point::new(x, y),
            Dimension::XYZ => {
                require(payload, 24, "point z ordinate")?;
                if self.strict {
                    require(payload, 32, "point measure")?;
                }
                Point::with_z(x, y, LittleEndian::read_f64(&payload[16..]))
            }
        };
        Ok(Geometry::Point(point))
    }

    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()> {
        let point = match geometry {
            Geometry::Null => {
                out.write_i32::<LittleEndian>(i32::from(ShapeType::Null))?;
                return Ok(());
            }
            Geometry::Point(point) => point,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot encode {other:?}",
                    self.shape_type()
                )))
            }
        };
        out.write_i32::<LittleEndian>(i32::from(self.shape_type()))?;
        out.write_f64::<LittleEndian>(point.x)?;
        out.write_f64::<LittleEndian>(point.y)?;
        if self.dim == Dimension::XYZ {
            let z = point.z.ok_or_else(|| {
                ShpError::Format("cannot encode a 2-D point as PointZ".to_string())
            })?;
            out.write_f64::<LittleEndian>(z)?;
            // measure, unused by this crate
            out.write_f64::<LittleEndian>(0.0)?;
        }
        Ok(())
    }

    fn length(&self, geometry: &Geometry) -> Result<usize> {
        match geometry {
            Geometry::Null => Ok(4),
            Geometry::Point(_) => Ok(match self.dim {
                Dimension::XY => 4 + 16,
                Dimension::XYZ => 4 + 32,
            }),
            other => Err(ShpError::Format(format!(
                "the {} handler cannot measure {other:?}",
                self.shape_type()
            ))),
        }
    }

    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry {
        Geometry::Point(match self.dim {
            Dimension::XY => Point::new(bbox.min_x, bbox.min_y),
            Dimension::XYZ => Point::with_z(bbox.min_x, bbox.min_y, 0.0),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trip_2d() {
        let handler = PointHandler::new(Dimension::XY, false);
        let geom = Geometry::Point(Point::new(3.5, -7.25));
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());

        let decoded = handler.read(&buf[4..], ShapeType::Point).unwrap();
        assert_eq!(decoded, geom);
    }

    #[test]
    fn round_trip_3d() {
        let handler = PointHandler::new(Dimension::XYZ, true);
        let geom = Geometry::Point(Point::with_z(1.0, 2.0, 3.0));
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());

        let decoded = handler.read(&buf[4..], ShapeType::PointZ).unwrap();
        assert_eq!(decoded, geom);
    }

    #[test]
    fn z_handler_falls_back_to_2d_code() {
        let handler_2d = PointHandler::new(Dimension::XY, false);
        let geom = Geometry::Point(Point::new(4.0, 5.0));
        let mut buf = Vec::new();
        handler_2d.write(&mut buf, &geom).unwrap();

        let handler_3d = PointHandler::new(Dimension::XYZ, false);
        let decoded = handler_3d.read(&buf[4..], ShapeType::Point).unwrap();
        assert_eq!(decoded, geom);
    }

    #[test]
    fn missing_measure_is_lenient_by_default() {
        let lenient = PointHandler::new(Dimension::XYZ, false);
        let strict = PointHandler::new(Dimension::XYZ, true);
        let geom = Geometry::Point(Point::with_z(1.0, 2.0, 3.0));
        let mut buf = Vec::new();
        lenient.write(&mut buf, &geom).unwrap();
        // chop the trailing measure off
        buf.truncate(buf.len() - 8);

        let decoded = lenient.read(&buf[4..], ShapeType::PointZ).unwrap();
        match decoded {
            Geometry::Point(p) => assert_relative_eq!(p.z.unwrap(), 3.0),
            other => panic!("expected point, got {other:?}"),
        }
        assert!(matches!(
            strict.read(&buf[4..], ShapeType::PointZ),
            Err(ShpError::Truncated(_))
        ));
    }

    #[test]
    fn null_declared_type_decodes_to_null() {
        let handler = PointHandler::new(Dimension::XY, false);
        assert_eq!(handler.read(&[], ShapeType::Null).unwrap(), Geometry::Null);
    }

    #[test]
    fn conflicting_declared_type_is_rejected() {
        let handler = PointHandler::new(Dimension::XY, false);
        assert!(matches!(
            handler.read(&[0; 16], ShapeType::Polygon),
            Err(ShpError::Format(_))
        ));
    }

    #[test]
    fn truncated_payload_is_fatal() {
        let handler = PointHandler::new(Dimension::XY, false);
        assert!(matches!(
            handler.read(&[0; 10], ShapeType::Point),
            Err(ShpError::Truncated(_))
        ));
    }
}
