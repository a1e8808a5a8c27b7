//! Resolution-based point decimation, applied per part while decoding.
//!
//! Two consecutive retained points always differ by more than the threshold
//! on at least one axis. All rules are part-local: decimation never looks
//! across part boundaries.

use crate::geometry::CoordSeq;

/// Independent x/y decimation thresholds.
///
/// Passed once at reader construction; a zero resolution on both axes turns
/// decimation into the identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The same threshold on both axes.
    pub fn uniform(res: f64) -> Self {
        Self { x: res, y: res }
    }

    fn is_noop(&self) -> bool {
        self.x <= 0.0 && self.y <= 0.0
    }
}

/// Decimate one line part. The output keeps the original endpoints and never
/// drops below 2 points.
pub(crate) fn decimate_line(seq: CoordSeq, res: Resolution) -> CoordSeq {
    decimate_part(seq, res, 2, false)
}

/// Decimate one ring. A closed input stays closed and the output never drops
/// below 4 points.
pub(crate) fn decimate_ring(seq: CoordSeq, res: Resolution) -> CoordSeq {
    decimate_part(seq, res, 4, true)
}

/// Decimate a point cloud: each point is compared against the previously
/// retained point only. No endpoint, closure, or minimum-count rule applies.
pub(crate) fn decimate_points(seq: CoordSeq, res: Resolution) -> CoordSeq {
    if res.is_noop() || seq.len() < 2 {
        return seq;
    }
    let retained = retained_indices(&seq, res, false);
    if retained.len() == seq.len() {
        return seq;
    }
    let mut out = CoordSeq::with_capacity(retained.len(), seq.dim());
    for i in retained {
        out.push_from(&seq, i);
    }
    out
}

fn decimate_part(seq: CoordSeq, res: Resolution, min_points: usize, ring: bool) -> CoordSeq {
    if res.is_noop() || seq.len() < 2 {
        return seq;
    }
    let n = seq.len();
    let retained = retained_indices(&seq, res, true);
    if retained.len() == n {
        // Nothing dropped: reuse the original sequence unmodified.
        return seq;
    }

    let mut out = CoordSeq::with_capacity(retained.len().max(min_points), seq.dim());
    for i in retained {
        out.push_from(&seq, i);
    }

    let was_closed = seq.xy(0) == seq.xy(n - 1);
    if ring && was_closed && out.first_xy() != out.last_xy() {
        out.push_from(&seq, 0);
    }
    while out.len() < min_points {
        out.push_last();
    }
    out
}

/// Indices of the points that survive decimation. The first point is always
/// kept; each later point is kept iff it differs from the last kept point by
/// more than the threshold on at least one axis. With `keep_last`, the final
/// point is kept unconditionally so endpoints never drift and rings are not
/// left open.
fn retained_indices(seq: &CoordSeq, res: Resolution, keep_last: bool) -> Vec<usize> {
    let n = seq.len();
    let mut retained = Vec::with_capacity(n);
    retained.push(0);
    let (mut rx, mut ry) = seq.xy(0);

    let interior_end = if keep_last { n - 1 } else { n };
    for i in 1..interior_end {
        let (x, y) = seq.xy(i);
        if (x - rx).abs() > res.x || (y - ry).abs() > res.y {
            retained.push(i);
            rx = x;
            ry = y;
        }
    }
    if keep_last {
        retained.push(n - 1);
    }
    retained
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Dimension;

    fn line(coords: &[(f64, f64)]) -> CoordSeq {
        let mut buf = Vec::with_capacity(coords.len() * 2);
        for (x, y) in coords {
            buf.push(*x);
            buf.push(*y);
        }
        CoordSeq::new(buf, Dimension::XY)
    }

    #[test]
    fn zero_resolution_is_identity() {
        let input = line(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0), (1.0, 1.0)]);
        let out = decimate_line(input.clone(), Resolution::uniform(0.0));
        assert_eq!(out, input);
    }

    #[test]
    fn endpoints_are_preserved() {
        let input = line(&[(0.0, 0.0), (0.1, 0.0), (0.2, 0.0), (0.3, 0.1), (10.0, 10.0)]);
        let out = decimate_line(input, Resolution::uniform(5.0));
        assert_eq!(out.first_xy(), Some((0.0, 0.0)));
        assert_eq!(out.last_xy(), Some((10.0, 10.0)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn retention_compares_against_last_retained_point() {
        // Each step is below the threshold, but the drift accumulates past it
        // at the third point.
        let input = line(&[(0.0, 0.0), (0.6, 0.0), (1.2, 0.0), (1.8, 0.0), (9.0, 0.0)]);
        let out = decimate_line(input, Resolution::new(1.0, 1.0));
        assert_eq!(out.xy(0), (0.0, 0.0));
        assert_eq!(out.xy(1), (1.2, 0.0));
        assert_eq!(out.last_xy(), Some((9.0, 0.0)));
    }

    #[test]
    fn closed_rings_stay_closed() {
        let input = line(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let out = decimate_ring(input, Resolution::uniform(1.0));
        assert_eq!(out.first_xy(), out.last_xy());
        assert!(out.len() >= 4);
    }

    #[test]
    fn collapsed_ring_is_padded_to_four_points() {
        let input = line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        let out = decimate_ring(input, Resolution::uniform(100.0));
        assert_eq!(out.len(), 4);
        assert_eq!(out.first_xy(), Some((0.0, 0.0)));
        assert_eq!(out.last_xy(), Some((0.0, 0.0)));
    }

    #[test]
    fn point_clouds_have_no_floor() {
        let input = line(&[(0.0, 0.0), (0.1, 0.1), (0.2, 0.0), (50.0, 50.0)]);
        let out = decimate_points(input, Resolution::uniform(10.0));
        assert_eq!(out.len(), 2);
        assert_eq!(out.xy(0), (0.0, 0.0));
        assert_eq!(out.xy(1), (50.0, 50.0));
    }

    #[test]
    fn z_ordinates_follow_retained_points() {
        let buf = vec![
            0.0, 0.0, 7.0, //
            0.1, 0.0, 8.0, //
            5.0, 0.0, 9.0,
        ];
        let input = CoordSeq::new(buf, Dimension::XYZ);
        let out = decimate_line(input, Resolution::uniform(1.0));
        assert_eq!(out.len(), 2);
        assert_eq!(out.z(0), Some(7.0));
        assert_eq!(out.z(1), Some(9.0));
    }
}
