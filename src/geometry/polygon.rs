use crate::geometry::polyline::line_string;
use crate::geometry::CoordSeq;

/// One shell ring together with the hole rings it contains.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonPart {
    pub(crate) exterior: CoordSeq,
    pub(crate) interiors: Vec<CoordSeq>,
}

impl PolygonPart {
    pub fn new(exterior: CoordSeq, interiors: Vec<CoordSeq>) -> Self {
        Self { exterior, interiors }
    }

    pub fn exterior(&self) -> &CoordSeq {
        &self.exterior
    }

    pub fn interiors(&self) -> &[CoordSeq] {
        &self.interiors
    }
}

/// A decoded polygon record: each part is one shell with its assigned holes.
///
/// A record with several clockwise rings decodes to several parts, so this is
/// the shapefile equivalent of a multi-polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub(crate) parts: Vec<PolygonPart>,
}

impl Polygon {
    pub fn new(parts: Vec<PolygonPart>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[PolygonPart] {
        &self.parts
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// All rings in decode order: each part's shell followed by its holes.
    pub fn rings(&self) -> impl Iterator<Item = &CoordSeq> {
        self.parts
            .iter()
            .flat_map(|part| std::iter::once(&part.exterior).chain(part.interiors.iter()))
    }
}

impl From<&PolygonPart> for geo::Polygon {
    fn from(value: &PolygonPart) -> Self {
        geo::Polygon::new(
            line_string(&value.exterior),
            value.interiors.iter().map(line_string).collect(),
        )
    }
}

impl From<&Polygon> for geo::MultiPolygon {
    fn from(value: &Polygon) -> Self {
        geo::MultiPolygon(value.parts.iter().map(geo::Polygon::from).collect())
    }
}
