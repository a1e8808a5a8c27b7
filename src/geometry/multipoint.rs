use crate::geometry::{CoordSeq, Point};

/// A decoded point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPoint {
    pub(crate) coords: CoordSeq,
}

impl MultiPoint {
    pub fn new(coords: CoordSeq) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &CoordSeq {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn point(&self, i: usize) -> Point {
        Point {
            x: self.coords.x(i),
            y: self.coords.y(i),
            z: self.coords.z(i),
        }
    }
}

impl From<&MultiPoint> for geo::MultiPoint {
    fn from(value: &MultiPoint) -> Self {
        geo::MultiPoint(
            value
                .coords
                .iter_xy()
                .map(|(x, y)| geo::Point::new(x, y))
                .collect(),
        )
    }
}
