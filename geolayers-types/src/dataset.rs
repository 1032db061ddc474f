use crate::id::CategoryId;
use crate::point::{GeoPoint, LabeledPoint};
use geo::{BoundingRect, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a dataset was loaded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    /// Points bound to one leaf category.
    Category(CategoryId),
    /// One indexed snapshot of weighted points (e.g. one year).
    Slice(u32),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category '{}'", id),
            Self::Slice(index) => write!(f, "slice {}", index),
        }
    }
}

/// An ordered, immutable sequence of points attributed to a single source.
///
/// A dataset is created once per load and never modified afterwards;
/// aggregation copies points into fresh accumulators instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    source: DatasetSource,
    points: Vec<GeoPoint>,
}

impl Dataset {
    pub fn new(source: DatasetSource, points: Vec<GeoPoint>) -> Self {
        Self { source, points }
    }

    /// A dataset with no points, used when a unit degrades to "contributes nothing".
    pub fn empty(source: DatasetSource) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    /// Sum of all point weights.
    pub fn total_weight(&self) -> f64 {
        self.points.iter().map(|p| p.weight).sum()
    }

    /// Points tagged with the category this dataset was loaded for.
    ///
    /// Returns `None` for slice datasets, which have no category.
    pub fn labeled(&self) -> Option<impl Iterator<Item = LabeledPoint> + '_> {
        match &self.source {
            DatasetSource::Category(id) => Some(
                self.points
                    .iter()
                    .map(move |point| LabeledPoint::new(id.clone(), *point)),
            ),
            DatasetSource::Slice(_) => None,
        }
    }

    /// Bounding rectangle of all points (x = longitude, y = latitude).
    ///
    /// `None` for an empty dataset.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let multi: MultiPoint<f64> = self
            .points
            .iter()
            .map(GeoPoint::to_point)
            .collect::<Vec<Point<f64>>>()
            .into();
        multi.bounding_rect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
