use crate::error::MatrixError;

/// A geographic point in (longitude, latitude) order, matching `geo::Point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

impl From<&GeoPoint> for geo::Point<f64> {
    fn from(p: &GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// The external routing engine, consulted exclusively while building a
/// travel-time matrix (`--calculateTM`), never during optimization itself.
/// A real implementation calls out to OSRM/GraphHopper/etc; only the
/// contract lives here.
pub trait RoutingEngine {
    /// Travel duration in seconds from `from` to `to`, or an error if the
    /// engine could not be reached or returned no route for the pair.
    fn travel_time(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, MatrixError>;
}

/// Builds a full matrix for `points` by calling `engine.travel_time` for
/// every ordered pair. `--calculateTM`'s only caller.
pub fn build_matrix<E: RoutingEngine>(
    engine: &E,
    points: &[GeoPoint],
) -> Result<crate::TravelTimeMatrix, MatrixError> {
    let n = points.len();
    let mut times = vec![0.0; n * n];
    for (i, from) in points.iter().enumerate() {
        for (j, to) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            times[i * n + j] = engine.travel_time(*from, *to)?;
        }
    }
    crate::TravelTimeMatrix::from_flat(times, n)
}

/// Fallback engine with no external dependency: great-circle distance over
/// a constant speed. Used when no routing collaborator is configured, or in
/// tests standing in for one.
pub struct HaversineEngine {
    pub speed_kmh: f64,
}

impl RoutingEngine for HaversineEngine {
    fn travel_time(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, MatrixError> {
        use geo::{Distance, Haversine};
        if self.speed_kmh <= 0.0 {
            return Err(MatrixError::RoutingEngineUnavailable {
                reason: "speed_kmh must be positive".to_string(),
            });
        }
        let meters = Haversine.distance(geo::Point::from(&from), geo::Point::from(&to));
        let meters_per_second = self.speed_kmh * 1000.0 / 3600.0;
        Ok(meters / meters_per_second)
    }
}

/// Same idea, flat-earth distance, usable for non-georeferenced (x, y)
/// test fixtures where points aren't real lon/lat pairs.
pub struct EuclideanEngine {
    pub speed_units_per_sec: f64,
}

impl RoutingEngine for EuclideanEngine {
    fn travel_time(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, MatrixError> {
        use geo::{Distance, Euclidean};
        if self.speed_units_per_sec <= 0.0 {
            return Err(MatrixError::RoutingEngineUnavailable {
                reason: "speed_units_per_sec must be positive".to_string(),
            });
        }
        let dist = Euclidean.distance(geo::Point::from(&from), geo::Point::from(&to));
        Ok(dist / self.speed_units_per_sec)
    }
}
