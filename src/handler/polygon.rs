use byteorder::{LittleEndian, WriteBytesExt};
use geo::winding_order::{Winding, WindingOrder};
use geo::Contains;

use crate::decimate::{decimate_ring, Resolution};
use crate::error::{Result, ShpError};
use crate::geometry::{
    line_string, BoundingBox, CoordSeq, Dimension, Geometry, Polygon, PolygonPart,
};
use crate::handler::polyline::{parts_length, read_parts, write_parts};
use crate::handler::{effective_dimension, ShapeHandler};
use crate::shape_type::ShapeType;

/// Codec for Polygon and PolygonZ records.
///
/// The payload layout is identical to a polyline's; the parts are rings,
/// wound clockwise for shells and counter-clockwise for holes. After
/// decoding, each hole is assigned to the shell that contains it.
#[derive(Debug, Clone, Copy)]
pub struct PolygonHandler {
    dim: Dimension,
    strict: bool,
}

impl PolygonHandler {
    pub fn new(dim: Dimension, strict: bool) -> Self {
        Self { dim, strict }
    }

    fn read_rings(&self, payload: &[u8], dim: Dimension) -> Result<Vec<CoordSeq>> {
        let rings = read_parts(payload, dim, self.strict, "polygon")?;
        if self.strict {
            for ring in &rings {
                if ring.len() < 4 {
                    return Err(ShpError::Format(format!(
                        "polygon ring with {} points, at least 4 required",
                        ring.len()
                    )));
                }
            }
        }
        Ok(rings)
    }
}

impl ShapeHandler for PolygonHandler {
    fn shape_type(&self) -> ShapeType {
        match self.dim {
            Dimension::XY => ShapeType::Polygon,
            Dimension::XYZ => ShapeType::PolygonZ,
        }
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        let rings = self.read_rings(payload, dim)?;
        Ok(Geometry::Polygon(assemble(rings)))
    }

    fn write(&self, out: &mut Vec<u8>, geometry: &Geometry) -> Result<()> {
        let polygon = match geometry {
            Geometry::Null => {
                out.write_i32::<LittleEndian>(i32::from(ShapeType::Null))?;
                return Ok(());
            }
            Geometry::Polygon(polygon) => polygon,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot encode {other:?}",
                    self.shape_type()
                )))
            }
        };
        let rings: Vec<CoordSeq> = polygon.rings().cloned().collect();
        write_parts(out, self.shape_type(), self.dim, &rings)
    }

    fn length(&self, geometry: &Geometry) -> Result<usize> {
        let polygon = match geometry {
            Geometry::Null => return Ok(4),
            Geometry::Polygon(polygon) => polygon,
            other => {
                return Err(ShpError::Format(format!(
                    "the {} handler cannot measure {other:?}",
                    self.shape_type()
                )))
            }
        };
        let num_rings = polygon.rings().count();
        let num_points: usize = polygon.rings().map(CoordSeq::len).sum();
        Ok(parts_length(self.dim, num_rings, num_points))
    }

    fn bbox_geometry(&self, bbox: &BoundingBox) -> Geometry {
        // A single clockwise rectangle ring spanning the box.
        let mut shell = CoordSeq::with_capacity(5, self.dim);
        shell.push(bbox.min_x, bbox.min_y, Some(0.0));
        shell.push(bbox.min_x, bbox.max_y, Some(0.0));
        shell.push(bbox.max_x, bbox.max_y, Some(0.0));
        shell.push(bbox.max_x, bbox.min_y, Some(0.0));
        shell.push(bbox.min_x, bbox.min_y, Some(0.0));
        Geometry::Polygon(Polygon::new(vec![PolygonPart::new(shell, Vec::new())]))
    }
}

/// A [`PolygonHandler`] that decimates each ring while decoding, keeping
/// rings closed and at least 4 points long.
#[derive(Debug, Clone, Copy)]
pub struct DecimatingPolygonHandler {
    inner: PolygonHandler,
    resolution: Resolution,
}

impl DecimatingPolygonHandler {
    pub fn new(dim: Dimension, strict: bool, resolution: Resolution) -> Self {
        Self {
            inner: PolygonHandler::new(dim, strict),
            resolution,
        }
    }
}

impl ShapeHandler for DecimatingPolygonHandler {
    fn shape_type(&self) -> ShapeType {
        self.inner.shape_type()
    }

    fn read(&self, payload: &[u8], declared: ShapeType) -> Result<Geometry> {
        let dim = match effective_dimension(self.shape_type(), declared)? {
            None => return Ok(Geometry::Null),
            Some(dim) => dim,
        };
        let rings = self.inner.read_rings(payload, dim)?;
        let rings: Vec<CoordSeq> = rings
            .into_iter()
            .map(|ring| decimate_ring(ring, self.resolution))
            .collect();
        Ok(Geometry::Polygon(assemble(rings)))
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

/// Group decoded rings into polygons: clockwise rings are shells,
/// counter-clockwise rings are holes, and each hole belongs to the shell
/// whose boundary contains it.
fn assemble(rings: Vec<CoordSeq>) -> Polygon {
    let mut shells: Vec<CoordSeq> = Vec::new();
    let mut holes: Vec<CoordSeq> = Vec::new();
    for ring in rings {
        if ring.is_empty() {
            continue;
        }
        match line_string(&ring).winding_order() {
            Some(WindingOrder::CounterClockwise) => holes.push(ring),
            // degenerate rings cannot contain holes either way; keep them
            // with the shells so no data is dropped
            Some(WindingOrder::Clockwise) | None => shells.push(ring),
        }
    }

    let parts = match (shells.len(), holes.len()) {
        // no holes to assign
        (_, 0) => shells
            .into_iter()
            .map(|shell| PolygonPart::new(shell, Vec::new()))
            .collect(),
        // a file without any explicit shell: promote the holes
        (0, _) => holes
            .into_iter()
            .map(|hole| PolygonPart::new(hole.reversed(), Vec::new()))
            .collect(),
        // everything belongs to the only shell
        (1, _) => {
            let shell = shells.remove(0);
            vec![PolygonPart::new(shell, holes)]
        }
        _ => assign_holes(shells, holes),
    };
    Polygon::new(parts)
}

fn assign_holes(shells: Vec<CoordSeq>, holes: Vec<CoordSeq>) -> Vec<PolygonPart> {
    let shell_polygons: Vec<geo::Polygon> = shells
        .iter()
        .map(|shell| geo::Polygon::new(line_string(shell), Vec::new()))
        .collect();

    let mut assigned: Vec<Vec<CoordSeq>> = shells.iter().map(|_| Vec::new()).collect();
    let mut orphans: Vec<CoordSeq> = Vec::new();
    for hole in holes {
        let owner = shell_polygons.iter().position(|shell| {
            hole.iter_xy()
                .any(|(x, y)| shell.contains(&geo::Point::new(x, y)))
        });
        match owner {
            Some(i) => assigned[i].push(hole),
            None => orphans.push(hole),
        }
    }

    let mut parts: Vec<PolygonPart> = shells
        .into_iter()
        .zip(assigned)
        .map(|(shell, shell_holes)| PolygonPart::new(shell, shell_holes))
        .collect();
    // a hole no shell contains describes its own area; keep it as a shell
    for orphan in orphans {
        parts.push(PolygonPart::new(orphan.reversed(), Vec::new()));
    }
    parts
}
