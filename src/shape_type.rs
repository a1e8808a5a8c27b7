use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{Result, ShpError};
use crate::geometry::Dimension;

/// The shape kinds supported by this crate, with their numeric codes.
///
/// Every record in a shapefile carries one of these codes, and it must match
/// the code declared in the file header (or be [`ShapeType::Null`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ShapeType {
    /// The placeholder record kind; decodes to an explicit empty geometry.
    Null = 0,
    /// A single x/y position
    Point = 1,
    /// One or more line parts
    PolyLine = 3,
    /// One or more rings, wound clockwise for shells
    Polygon = 5,
    /// An unordered cloud of points
    MultiPoint = 8,
    /// A single x/y/z position
    PointZ = 11,
    /// Line parts with a z ordinate per point
    PolyLineZ = 13,
    /// Rings with a z ordinate per point
    PolygonZ = 15,
    /// A point cloud with a z ordinate per point
    MultiPointZ = 18,
}

impl ShapeType {
    /// Resolve a numeric code read from the file, rejecting codes unknown to
    /// the registry.
    pub fn parse(code: i32) -> Result<Self> {
        Self::try_from(code).map_err(|_| ShpError::Format(format!("unknown shape type code {code}")))
    }

    /// The dimensionality of coordinates carried by this kind.
    pub fn dimension(&self) -> Dimension {
        match self {
            ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ => Dimension::XYZ,
            _ => Dimension::XY,
        }
    }

    /// The 2-D counterpart of this kind. Identity for 2-D kinds and for
    /// [`ShapeType::Null`].
    pub fn base(&self) -> ShapeType {
        match self {
            ShapeType::PointZ => ShapeType::Point,
            ShapeType::PolyLineZ => ShapeType::PolyLine,
            ShapeType::PolygonZ => ShapeType::Polygon,
            ShapeType::MultiPointZ => ShapeType::MultiPoint,
            other => *other,
        }
    }

    /// Whether records of this kind carry a single coordinate instead of a
    /// bounding box at the head of their payload.
    pub(crate) fn is_point_kind(&self) -> bool {
        matches!(self, ShapeType::Point | ShapeType::PointZ)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
