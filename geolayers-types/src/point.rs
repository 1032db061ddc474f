use crate::id::CategoryId;
use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic point with an intensity weight.
///
/// Unweighted points carry [`GeoPoint::DEFAULT_WEIGHT`]. The cluster layer
/// ignores the weight; the heatmap layer uses it as point intensity.
///
/// # Examples
///
/// ```
/// use geolayers_types::point::GeoPoint;
///
/// let cafe = GeoPoint::new(59.9343, 30.3351);
/// assert_eq!(cafe.weight, 1.0);
///
/// // geo points are (x = longitude, y = latitude)
/// let p = cafe.to_point();
/// assert_eq!(p.x(), 30.3351);
/// assert_eq!(p.y(), 59.9343);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "GeoPoint::default_weight")]
    pub weight: f64,
}

impl GeoPoint {
    /// Weight assigned to points whose record carries none.
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    const fn default_weight() -> f64 {
        Self::DEFAULT_WEIGHT
    }

    /// Create an unweighted point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self::weighted(lat, lng, Self::DEFAULT_WEIGHT)
    }

    /// Create a point with an explicit intensity weight.
    pub fn weighted(lat: f64, lng: f64, weight: f64) -> Self {
        Self { lat, lng, weight }
    }

    /// Project to a `geo` point (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        point.to_point()
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// A point tagged with the leaf category it was loaded for.
///
/// This is the item shape handed to the cluster renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub category: CategoryId,
    pub point: GeoPoint,
}

impl LabeledPoint {
    pub fn new(category: CategoryId, point: GeoPoint) -> Self {
        Self { category, point }
    }
}
