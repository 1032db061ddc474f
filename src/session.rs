//! Event-driven session wiring the selection, loader, sinks and renderers.
//!
//! All calls run on the thread that delivers UI events. Loads are
//! synchronous, so at most one aggregation is in flight and a result is
//! always handed to the renderer whole.

use crate::category::CategoryTree;
use crate::config::{SessionConfig, SessionMode};
use crate::error::Result;
use crate::loader::DatasetLoader;
use crate::pipeline::{
    AggregationReport, ClusterRenderer, ClusterSink, HeatmapRenderer, HeatmapSink,
};
use crate::selection::{SelectionBits, SelectionState};
use crate::storage::ResourceStore;
use geolayers_types::dataset::Dataset;
use geolayers_types::point::LabeledPoint;
use std::sync::Arc;

/// One map session.
///
/// Built by [`crate::SessionBuilder`]. The configuration and the category
/// tree are fixed for the lifetime of the session; the selection changes
/// only through [`Session::toggle`] and the heatmap only through
/// [`Session::commit_slice`].
pub struct Session<S> {
    pub(crate) config: SessionConfig,
    pub(crate) tree: Arc<CategoryTree>,
    pub(crate) selection: SelectionState,
    pub(crate) loader: DatasetLoader<S>,
    pub(crate) clusters: ClusterSink,
    pub(crate) heatmap: HeatmapSink,
    pub(crate) cluster_renderer: Option<Box<dyn ClusterRenderer>>,
    pub(crate) heatmap_renderer: Option<Box<dyn HeatmapRenderer>>,
}

impl<S: ResourceStore> Session<S> {
    /// Initial render: commit the configured initial slice and push the
    /// (initially empty) cluster items.
    ///
    /// A failing initial slice is logged and leaves the heatmap empty; it
    /// does not fail the session.
    pub fn start(&mut self) {
        let mode = self.mode();
        if mode.heatmap() {
            self.heatmap.set_pending(self.config.slices.initial);
            if let Err(e) = self.heatmap.commit(&self.loader) {
                log::warn!("Initial slice could not be loaded: {}", e);
            }
            self.push_heatmap();
        }
        if mode.clusters() {
            self.clusters.recompute(&self.selection, &self.loader);
            self.push_clusters();
        }
        log::debug!("Session started in {:?} mode", mode);
    }

    /// Checkbox click on `id`.
    ///
    /// Updates the selection and, when the session shows clusters, rebuilds
    /// and pushes the merged items. Returns `None` in heatmap-only mode.
    ///
    /// # Errors
    ///
    /// `UnknownCategory` if `id` is not in the tree; nothing changes then.
    pub fn toggle(&mut self, id: &str) -> Result<Option<AggregationReport>> {
        self.selection.toggle(id)?;
        if !self.mode().clusters() {
            return Ok(None);
        }
        let report = self.clusters.recompute(&self.selection, &self.loader);
        self.push_clusters();
        Ok(Some(report))
    }

    /// Slider moved to `index` without release. Never loads.
    pub fn set_pending_slice(&mut self, index: u32) {
        self.heatmap.set_pending(index);
    }

    /// Slider released: load the pending slice and replace the heatmap.
    ///
    /// In combined mode the cluster items are pushed again after the
    /// heatmap, as the map is redrawn as a whole. Returns `None` in
    /// cluster-only mode, where nothing is loaded.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `MalformedData`; the previous heatmap stays on screen.
    pub fn commit_slice(&mut self) -> Result<Option<u32>> {
        if !self.mode().heatmap() {
            return Ok(None);
        }
        let index = self.heatmap.commit(&self.loader)?;
        self.push_heatmap();
        if self.mode() == SessionMode::Combined {
            self.push_clusters();
        }
        Ok(Some(index))
    }

    fn push_clusters(&mut self) {
        if let Some(renderer) = self.cluster_renderer.as_deref_mut() {
            self.clusters.render_to(renderer);
        }
    }

    fn push_heatmap(&mut self) {
        if let Some(renderer) = self.heatmap_renderer.as_deref_mut() {
            self.heatmap.render_to(renderer);
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.config.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tree(&self) -> &Arc<CategoryTree> {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Current selection as a bit vector in flattened order.
    pub fn encode_selection(&self) -> SelectionBits {
        self.selection.encode()
    }

    pub fn loader(&self) -> &DatasetLoader<S> {
        &self.loader
    }

    pub fn cluster_items(&self) -> &[LabeledPoint] {
        self.clusters.current_result()
    }

    pub fn weighted_result(&self) -> &Dataset {
        self.heatmap.current_weighted_result()
    }

    pub fn active_slice(&self) -> Option<u32> {
        self.heatmap.active_index()
    }

    pub fn pending_slice(&self) -> u32 {
        self.heatmap.pending()
    }

    pub fn clusters(&self) -> &ClusterSink {
        &self.clusters
    }

    pub fn heatmap(&self) -> &HeatmapSink {
        &self.heatmap
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.config.mode)
            .field("categories", &self.tree.total_categories())
            .field("cluster_items", &self.clusters.current_result().len())
            .field("active_slice", &self.heatmap.active_index())
            .finish_non_exhaustive()
    }
}
