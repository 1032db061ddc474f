//! Aggregation of loaded datasets into the shapes each renderer expects.
//!
//! - [`ClusterSink`] merges the points of every selected leaf into one list of
//!   labeled items, rebuilt from scratch on each selection change.
//! - [`HeatmapSink`] holds one active slice. Slider drags only record a
//!   pending index; [`HeatmapSink::commit`] loads it and replaces the result.

use crate::error::{LayersError, Result};
use crate::gradient::GradientConfig;
use crate::loader::DatasetLoader;
use crate::selection::SelectionState;
use crate::storage::ResourceStore;
use geolayers_types::dataset::{Dataset, DatasetSource};
use geolayers_types::gradient::GradientSpec;
use geolayers_types::id::CategoryId;
use geolayers_types::point::LabeledPoint;

/// Receives cluster items. Calls are never interleaved.
pub trait ClusterRenderer {
    /// Remove every item currently shown
    fn clear_items(&mut self);

    /// Add items on top of those already shown
    fn add_items(&mut self, items: &[LabeledPoint]);
}

/// Receives complete heatmap replacements; there is no incremental update.
pub trait HeatmapRenderer {
    fn replace_heatmap(&mut self, points: &Dataset, gradient: &GradientSpec);
}

/// Outcome of one cluster recompute.
#[derive(Debug, Default)]
pub struct AggregationReport {
    /// Leaves whose points made it into the result, in flattened order
    pub loaded: Vec<CategoryId>,
    /// Leaves that contributed nothing, with the reason
    pub skipped: Vec<(CategoryId, LayersError)>,
}

impl AggregationReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Merged, category-tagged points of all selected leaves.
#[derive(Debug, Clone, Default)]
pub struct ClusterSink {
    items: Vec<LabeledPoint>,
    revision: u64,
}

impl ClusterSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the merged result from the current selection.
    ///
    /// Leaves are visited in flattened order. A leaf whose load fails is
    /// logged and skipped; the others still contribute. Running twice on an
    /// unchanged selection yields the same items.
    pub fn recompute<S: ResourceStore>(
        &mut self,
        selection: &SelectionState,
        loader: &DatasetLoader<S>,
    ) -> AggregationReport {
        let mut report = AggregationReport::default();
        let mut merged = Vec::new();

        for id in selection.selected_leaves() {
            match loader.load_by_category(id) {
                Ok(dataset) => {
                    merged.extend(
                        dataset
                            .iter()
                            .map(|point| LabeledPoint::new(id.clone(), *point)),
                    );
                    report.loaded.push(id.clone());
                }
                Err(e) => {
                    log::warn!("Skipping category '{}': {}", id, e);
                    report.skipped.push((id.clone(), e));
                }
            }
        }

        self.items = merged;
        self.revision += 1;
        log::debug!(
            "Cluster recompute #{}: {} items from {} categories ({} skipped)",
            self.revision,
            self.items.len(),
            report.loaded.len(),
            report.skipped.len()
        );
        report
    }

    pub fn current_result(&self) -> &[LabeledPoint] {
        &self.items
    }

    /// Number of recomputes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace everything the renderer shows with the current items.
    pub fn render_to(&self, renderer: &mut dyn ClusterRenderer) {
        renderer.clear_items();
        if !self.items.is_empty() {
            renderer.add_items(&self.items);
        }
    }
}

/// Weighted points of the active slice, with debounce-to-commit semantics.
#[derive(Debug, Clone)]
pub struct HeatmapSink {
    gradient: GradientConfig,
    pending: u32,
    active: Option<u32>,
    result: Dataset,
}

impl HeatmapSink {
    /// A sink whose pending slot starts at `initial`. Nothing is active until
    /// the first commit.
    pub fn new(gradient: GradientConfig, initial: u32) -> Self {
        Self {
            gradient,
            pending: initial,
            active: None,
            result: Dataset::empty(DatasetSource::Slice(initial)),
        }
    }

    /// Record an intermediate slider value. Never loads.
    pub fn set_pending(&mut self, index: u32) {
        self.pending = index;
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn active_index(&self) -> Option<u32> {
        self.active
    }

    /// Load the pending slice and make it active.
    ///
    /// A missing resource commits an empty dataset. On `OutOfRange` or
    /// `MalformedData` the commit is rejected and the previous active slice
    /// and result stay in place.
    pub fn commit<S: ResourceStore>(&mut self, loader: &DatasetLoader<S>) -> Result<u32> {
        let index = self.pending;
        self.gradient.config_for(index)?;

        let dataset = match loader.load_by_slice(index) {
            Ok(dataset) => dataset,
            Err(LayersError::ResourceNotFound(key)) => {
                log::warn!("No data for slice {} (resource '{}')", index, key);
                Dataset::empty(DatasetSource::Slice(index))
            }
            Err(e) => {
                log::warn!("Rejected commit of slice {}: {}", index, e);
                return Err(e);
            }
        };

        log::debug!("Committed slice {} with {} points", index, dataset.len());
        self.result = dataset;
        self.active = Some(index);
        Ok(index)
    }

    pub fn current_weighted_result(&self) -> &Dataset {
        &self.result
    }

    /// Gradient of the active slice, if any.
    pub fn current_gradient(&self) -> Option<&GradientSpec> {
        self.active
            .and_then(|index| self.gradient.config_for(index).ok())
    }

    pub fn gradient(&self) -> &GradientConfig {
        &self.gradient
    }

    /// Push the active slice to the renderer. No-op before the first commit.
    pub fn render_to(&self, renderer: &mut dyn HeatmapRenderer) {
        if let Some(gradient) = self.current_gradient() {
            renderer.replace_heatmap(&self.result, gradient);
        }
    }
}
