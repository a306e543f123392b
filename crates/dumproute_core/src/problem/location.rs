use geo::{Distance, Euclidean};

use crate::define_index_newtype;

define_index_newtype!(LocationIdx, Location);

/// A node's plotted (x, y) coordinate, as carried by the container/otherlocs
/// input files. Travel time between nodes is always read from the
/// travel-time matrix, never derived from these coordinates; `Location` only
/// backs the compatibility oracle's geographic nearest-to-edge helper, used
/// by the initial-solution builder as a tie-break hint.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    point: geo::Point,
}

impl Location {
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self {
            point: geo::Point::new(x, y),
        }
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn euclidean_distance(&self, to: &Location) -> f64 {
        Euclidean.distance(self.point, to.point)
    }

    /// Shortest distance from this point to the segment `a`-`b`, clamping
    /// the projection to the segment rather than the infinite line through
    /// it. Used to rank how geographically close a candidate pickup is to
    /// a route's trailing edge, independent of the travel-time matrix.
    pub fn distance_to_segment(&self, a: &Location, b: &Location) -> f64 {
        let (ax, ay) = (a.x(), a.y());
        let (bx, by) = (b.x(), b.y());
        let (px, py) = (self.x(), self.y());

        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f64::EPSILON {
            return self.euclidean_distance(a);
        }

        let t = ((px - ax) * dx + (py - ay) * dy) / len_sq;
        let t = t.clamp(0.0, 1.0);
        let (closest_x, closest_y) = (ax + t * dx, ay + t * dy);
        Euclidean.distance(self.point, geo::Point::new(closest_x, closest_y))
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_distance_matches_pythagoras() {
        let a = Location::from_xy(0.0, 0.0);
        let b = Location::from_xy(3.0, 4.0);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn distance_to_segment_clamps_to_the_nearest_endpoint() {
        let a = Location::from_xy(0.0, 0.0);
        let b = Location::from_xy(10.0, 0.0);
        let beyond_b = Location::from_xy(15.0, 0.0);
        assert!((beyond_b.distance_to_segment(&a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn distance_to_segment_uses_perpendicular_projection_inside_the_segment() {
        let a = Location::from_xy(0.0, 0.0);
        let b = Location::from_xy(10.0, 0.0);
        let above_midpoint = Location::from_xy(5.0, 3.0);
        assert!((above_midpoint.distance_to_segment(&a, &b) - 3.0).abs() < 1e-9);
    }
}
