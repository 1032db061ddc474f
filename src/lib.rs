//! Checkbox-driven category selection feeding cluster and heatmap map layers.
//!
//! ```rust
//! use geolayers::{MemoryStore, SessionBuilder, SessionConfig};
//!
//! let store = MemoryStore::new()
//!     .with("pub1", r#"[{"lat": 59.9343, "lng": 30.3351}]"#)
//!     .with("d2010", r#"[{"lat": 59.93, "lng": 30.33, "weight": 3.0}]"#);
//!
//! let mut session = SessionBuilder::new(store)
//!     .config(SessionConfig::amenities())
//!     .build()?;
//! session.start();
//!
//! session.toggle("cafe")?;
//! assert_eq!(session.cluster_items().len(), 1);
//!
//! session.set_pending_slice(4);
//! assert_eq!(session.active_slice(), Some(0));
//! # Ok::<(), geolayers::LayersError>(())
//! ```

pub mod builder;
pub mod category;
pub mod config;
pub mod error;
pub mod format;
pub mod gradient;
pub mod loader;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod storage;

pub use builder::SessionBuilder;
pub use error::{LayersError, Result};
pub use session::Session;

pub use category::{CategoryDecl, CategoryNode, CategoryTree, FlattenedIndex};
pub use config::{GradientOverride, SessionConfig, SessionMode, SliceConfig};
pub use gradient::{GradientConfig, SliceRange};
pub use loader::{DatasetLoader, ResourceTable};
pub use pipeline::{
    AggregationReport, ClusterRenderer, ClusterSink, HeatmapRenderer, HeatmapSink,
};
pub use selection::{SelectionBits, SelectionState};
pub use storage::{DirectoryStore, MemoryStore, ResourceStore};

pub use geolayers_types::dataset::{Dataset, DatasetSource};
pub use geolayers_types::gradient::{Color, ColorStop, GradientSpec};
pub use geolayers_types::id::CategoryId;
pub use geolayers_types::point::{GeoPoint, LabeledPoint};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, Session, SessionBuilder, SessionConfig, SessionMode, LayersError};

    pub use crate::{CategoryId, CategoryTree, SelectionState};

    pub use crate::{Dataset, GeoPoint, GradientSpec, LabeledPoint};

    pub use crate::{ClusterRenderer, HeatmapRenderer};

    pub use crate::{DirectoryStore, MemoryStore, ResourceStore};
}
