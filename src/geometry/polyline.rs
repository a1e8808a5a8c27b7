use crate::geometry::CoordSeq;

/// A decoded polyline record: one or more line parts.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub(crate) lines: Vec<CoordSeq>,
}

impl Polyline {
    pub fn new(lines: Vec<CoordSeq>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CoordSeq] {
        &self.lines
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// The total point count across all parts.
    pub fn num_points(&self) -> usize {
        self.lines.iter().map(CoordSeq::len).sum()
    }
}

impl From<&Polyline> for geo::MultiLineString {
    fn from(value: &Polyline) -> Self {
        geo::MultiLineString(value.lines.iter().map(line_string).collect())
    }
}

pub(crate) fn line_string(seq: &CoordSeq) -> geo::LineString {
    geo::LineString(
        seq.iter_xy()
            .map(|(x, y)| geo::Coord { x, y })
            .collect(),
    )
}
