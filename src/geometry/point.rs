/// A single decoded position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

impl From<&Point> for geo::Point {
    fn from(value: &Point) -> Self {
        geo::Point::new(value.x, value.y)
    }
}

impl From<&Point> for geo::Coord {
    fn from(value: &Point) -> Self {
        geo::Coord { x: value.x, y: value.y }
    }
}
