//! Decoded geometry values and their building blocks.

mod bounds;
mod coord;
mod multipoint;
mod point;
mod polygon;
mod polyline;

pub use bounds::BoundingBox;
pub use coord::CoordSeq;
pub use multipoint::MultiPoint;
pub use point::Point;
pub use polygon::{Polygon, PolygonPart};
pub use polyline::Polyline;

pub(crate) use polyline::line_string;

use enum_as_inner::EnumAsInner;

/// The dimensionality of a coordinate sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    XY,
    XYZ,
}

impl Dimension {
    /// The number of ordinates per coordinate.
    pub fn size(&self) -> usize {
        match self {
            Dimension::XY => 2,
            Dimension::XYZ => 3,
        }
    }
}

/// A decoded shape record payload.
///
/// The variants form a closed set: every kind a shapefile can declare decodes
/// to exactly one of them, and the Null sentinel is an explicit value rather
/// than an error or a missing geometry.
#[derive(Clone, Debug, PartialEq, EnumAsInner)]
pub enum Geometry {
    /// The explicit empty-geometry sentinel produced by Null records.
    Null,
    Point(Point),
    MultiPoint(MultiPoint),
    Polyline(Polyline),
    Polygon(Polygon),
}

impl Geometry {
    /// Convert to a [geo] geometry, dropping any z ordinates. `Null` has no
    /// geo equivalent and converts to `None`.
    pub fn to_geo(&self) -> Option<geo::Geometry> {
        match self {
            Geometry::Null => None,
            Geometry::Point(g) => Some(geo::Geometry::Point(g.into())),
            Geometry::MultiPoint(g) => Some(geo::Geometry::MultiPoint(g.into())),
            Geometry::Polyline(g) => Some(geo::Geometry::MultiLineString(g.into())),
            Geometry::Polygon(g) => Some(geo::Geometry::MultiPolygon(g.into())),
        }
    }
}
