use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::decimate::{decimate_points, Resolution};
use crate::error::{Result, ShpError};
use crate::geometry::{BoundingBox, CoordSeq, Dimension, Geometry, MultiPoint};
use crate::handler::{effective_dimension, ordinate_range, require, write_bbox, ShapeHandler};
use crate::shape_type::ShapeType;

/// Codec for MultiPoint and MultiPointZ records.
///
/// Payload layout past the shape-type code: a 32-byte bounding box, the
/// point count, the interleaved x/y block, and for the 3-D kind a z range
/// and one z per point followed by the optional measure block.
#[derive(Debug, Clone, Copy)]
pub struct MultiPointHandler {
    dim: Dimension,
    strict: bool,
}

impl MultiPointHandler {
    pub fn new(dim: Dimension, strict: bool) -> Self {
        Self { dim, strict }
    }

    fn read_coords(&self, payload: &[u8], dim: Dimension) -> Result<CoordSeq> {
        require(payload, 36, "multipoint header")?;
        let num_points = LittleEndian::read_i32(&payload[32..]);
        if num_points < 0 {
            return Err(ShpError::Format(format!(
                "multipoint with negative point count {num_points}"
            )));
        }
        let n = num_points as usize;
        let xy_end = 36 + 16 * n;
        require(payload, xy_end, "multipoint coordinate block")?;

        let z_values = 16 + xy_end;
        if dim == Dimension::XYZ {
            require(payload, z_values + 8 * n, "multipoint z block")?;
            if self.strict {
                require(payload, z_values + 8 * n + 16 + 8 * n, "multipoint measure block")?;
            }
        }

        let mut coords = CoordSeq::with_capacity(n, dim);
        for i in 0..n {
            let x = LittleEndian::read_f64(&payload[36 + 16 * i..]);
            let y = LittleEndian::read_f64(&payload[36 + 16 * i + 8..]);
            let z = match dim {
                Dimension::XY => None,
                Dimension::XYZ => Some(LittleEndian::read_f64(&payload[z_values + 8 * i..])),
            };
            coords.push(x, y, z);
        }
        Ok(coords)
    }
}

impl ShapeHandler for MultiPointHandler {
    fn shape_type(&self) -> ShapeType {
        match self.dim {
            Dimension::XY => ShapeType::MultiPoint,
            Dimension::XYZ => ShapeType::MultiPointZ,
        }
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        let coords = self.read_coords(payload, dim)?;
        Ok(Geometry::MultiPoint(MultiPoint::new(coords)))
    }

    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()> {
        let multipoint = match geometry {
            Geometry::Null => {
                out.write_i32::<LittleEndian>(i32::from(ShapeType::Null))?;
                return Ok(());
            }
            Geometry::MultiPoint(multipoint) => multipoint,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot encode {other:?}",
                    self.shape_type()
                )))
            }
        };
        let coords = multipoint.coords();
        if self.dim == Dimension::XYZ && coords.dim() != Dimension::XYZ {
            return Err(ShpError::Format(
                "cannot encode a 2-D multipoint as MultiPointZ".to_string(),
            ));
        }
        let n = coords.len();

        out.write_i32::<LittleEndian>(i32::from(self.shape_type()))?;
        write_bbox(out, &BoundingBox::from_coords(coords.iter_xy()))?;
        out.write_i32::<LittleEndian>(n as i32)?;
        for (x, y) in coords.iter_xy() {
            out.write_f64::<LittleEndian>(x)?;
            out.write_f64::<LittleEndian>(y)?;
        }
        if self.dim == Dimension::XYZ {
            write_z_and_measures(out, (0..n).map(|i| coords.z(i).unwrap_or(0.0)))?;
        }
        Ok(())
    }

    fn length(&self, geometry: &Geometry) -> Result<usize> {
        let multipoint = match geometry {
            Geometry::Null => return Ok(4),
            Geometry::MultiPoint(multipoint) => multipoint,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot measure {other:?}",
                    self.shape_type()
                )))
            }
        };
        let n = multipoint.len();
        Ok(match self.dim {
            Dimension::XY => 4 + 32 + 4 + 16 * n,
            Dimension::XYZ => 4 + 32 + 4 + 16 * n + 2 * (16 + 8 * n),
        })
    }

    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry {
        let mut coords = CoordSeq::with_capacity(2, self.dim);
        coords.push(bbox.min_x, bbox.min_y, Some(0.0));
        coords.push(bbox.max_x, bbox.max_y, Some(0.0));
        Geometry::MultiPoint(MultiPoint::new(coords))
    }
}

/// A [`MultiPointHandler`] that thins the point cloud against a resolution
/// while decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecimatingMultiPointHandler {
    inner: MultiPointHandler,
    resolution: Resolution,
}

impl DecimatingMultiPointHandler {
    pub fn new(dim: Dimension, strict: bool, resolution: Resolution) -> Self {
        Self {
            inner: MultiPointHandler::new(dim, strict),
            resolution,
        }
    }
}

impl ShapeHandler for DecimatingMultiPointHandler {
    fn shape_type(&self) -> ShapeType {
        self.inner.shape_type()
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        let coords = self.inner.read_coords(payload, dim)?;
        let coords = decimate_points(coords, self.resolution);
        Ok(Geometry::MultiPoint(MultiPoint::new(coords)))
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

/// Append a z block (range then values) and a zeroed measure block of the
/// same shape.
pub(crate) fn write_z_and_measures(
    out: &mut Vec<u8>,
    z_values: impl Iterator<Item = f64> + Clone,
) -> Result<()> {
    let (z_min, z_max) = ordinate_range(z_values.clone());
    out.write_f64::<LittleEndian>(z_min)?;
    out.write_f64::<LittleEndian>(z_max)?;
    let mut n = 0;
    for z in z_values {
        out.write_f64::<LittleEndian>(z)?;
        n += 1;
    }
    out.write_f64::<LittleEndian>(0.0)?;
    out.write_f64::<LittleEndian>(0.0)?;
    for _ in 0..n {
        out.write_f64::<LittleEndian>(0.0)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::read_bbox;
    use approx::assert_relative_eq;

    fn cloud_2d() -> Geometry {
        let coords = CoordSeq::new(vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0], Dimension::XY);
        Geometry::MultiPoint(MultiPoint::new(coords))
    }

    #[test]
    fn round_trip_2d() {
        let handler = MultiPointHandler::new(Dimension::XY, false);
        let geom = cloud_2d();
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());
        assert_eq!(handler.read(&buf[4..], ShapeType::MultiPoint).unwrap(), geom);
    }

    #[test]
    fn round_trip_3d() {
        let handler = MultiPointHandler::new(Dimension::XYZ, true);
        let coords = CoordSeq::new(vec![0.0, 0.0, 5.0, 1.0, 1.0, 6.0], Dimension::XYZ);
        let geom = Geometry::MultiPoint(MultiPoint::new(coords));
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(buf.len(), handler.length(&geom).unwrap());
        assert_eq!(handler.read(&buf[4..], ShapeType::MultiPointZ).unwrap(), geom);
    }

    #[test]
    fn stored_bbox_matches_coords() {
        let handler = MultiPointHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        handler.write(&mut buf, &cloud_2d()).unwrap();
        let bbox = read_bbox(&buf, 4);
        assert_relative_eq!(bbox.min_x, 0.0);
        assert_relative_eq!(bbox.max_x, 10.0);
        assert_relative_eq!(bbox.max_y, 10.0);
    }

    #[test]
    fn decimation_thins_the_cloud() {
        let coords = CoordSeq::new(
            vec![0.0, 0.0, 0.5, 0.5, 1.0, 0.0, 50.0, 50.0],
            Dimension::XY,
        );
        let geom = Geometry::MultiPoint(MultiPoint::new(coords));
        let plain = MultiPointHandler::new(Dimension::XY, false);
        let mut buf = Vec::new();
        plain.write(&mut buf, &geom).unwrap();

        let decimating =
            DecimatingMultiPointHandler::new(Dimension::XY, false, Resolution::uniform(2.0));
        let decoded = decimating.read(&buf[4..], ShapeType::MultiPoint).unwrap();
        match decoded {
            Geometry::MultiPoint(mp) => {
                assert_eq!(mp.len(), 2);
                assert_eq!(mp.coords().xy(0), (0.0, 0.0));
                assert_eq!(mp.coords().xy(1), (50.0, 50.0));
            }
            other => panic!("expected multipoint, got {other:?}"),
        }
    }

    #[test]
    fn empty_cloud_is_valid() {
        let handler = MultiPointHandler::new(Dimension::XY, false);
        let geom = Geometry::MultiPoint(MultiPoint::new(CoordSeq::empty(Dimension::XY)));
        let mut buf = Vec::new();
        handler.write(&mut buf, &geom).unwrap();
        assert_eq!(handler.read(&buf[4..], ShapeType::MultiPoint).unwrap(), geom);
    }
}
