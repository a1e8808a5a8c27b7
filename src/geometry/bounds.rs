/// An axis-aligned 2-D bounding box, as stored in the file header and at the
/// head of every non-point record payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// The degenerate box around a single position.
    pub fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// The tight box around a set of positions. Empty input yields the zero
    /// box, matching what a Null record stores.
    pub fn from_coords(coords: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut bbox: Option<BoundingBox> = None;
        for (x, y) in coords {
            match &mut bbox {
                None => bbox = Some(Self::from_point(x, y)),
                Some(b) => b.expand(x, y),
            }
        }
        bbox.unwrap_or(Self::new(0.0, 0.0, 0.0, 0.0))
    }

    pub fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_coords_is_tight() {
        let bbox = BoundingBox::from_coords([(2.0, 3.0), (-1.0, 7.0), (4.0, 0.0)].into_iter());
        assert_eq!(bbox, BoundingBox::new(-1.0, 0.0, 4.0, 7.0));
    }

    #[test]
    fn empty_input_is_zero_box() {
        let bbox = BoundingBox::from_coords(std::iter::empty());
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 0.0, 0.0));
    }
}
