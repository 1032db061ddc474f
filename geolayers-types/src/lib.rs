//! # geolayers-types
//!
//! Plain data types shared by the geolayers selection pipeline and the
//! renderers that consume its output:
//!
//! - **Identity**: `CategoryId`
//! - **Points**: `GeoPoint`, `LabeledPoint`
//! - **Datasets**: `Dataset`, `DatasetSource`
//! - **Gradients**: `Color`, `ColorStop`, `GradientSpec`
//!
//! All types are serializable with Serde and convert to the `geo` crate's
//! primitives where a geometric view makes sense.
//!
//! ## Examples
//!
//! ```rust
//! use geolayers_types::point::GeoPoint;
//! use geolayers_types::dataset::{Dataset, DatasetSource};
//!
//! let points = vec![GeoPoint::new(59.9343, 30.3351), GeoPoint::weighted(59.95, 30.31, 4.0)];
//! let dataset = Dataset::new(DatasetSource::Slice(3), points);
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset.total_weight(), 5.0);
//! ```

pub mod dataset;
pub mod gradient;
pub mod id;
pub mod point;
