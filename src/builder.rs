//! Session builder
//!
//! Validates a [`SessionConfig`] once, derives the immutable category tree
//! and gradient table from it, and wires them to a resource store and the
//! renderer collaborators.

use crate::config::SessionConfig;
use crate::error::{LayersError, Result};
use crate::loader::DatasetLoader;
use crate::pipeline::{ClusterRenderer, ClusterSink, HeatmapRenderer, HeatmapSink};
use crate::selection::{SelectionBits, SelectionState};
use crate::session::Session;
use crate::storage::ResourceStore;
use std::sync::Arc;

/// Builder for a [`Session`] over a resource store.
pub struct SessionBuilder<S> {
    store: S,
    config: SessionConfig,
    selection: Option<SelectionBits>,
    cluster_renderer: Option<Box<dyn ClusterRenderer>>,
    heatmap_renderer: Option<Box<dyn HeatmapRenderer>>,
}

impl<S: ResourceStore> SessionBuilder<S> {
    /// Create a builder with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: SessionConfig::default(),
            selection: None,
            cluster_renderer: None,
            heatmap_renderer: None,
        }
    }

    /// Set the session configuration (tree, resources, slices, gradient, mode).
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Restore a previously encoded selection instead of starting all-false.
    pub fn selection(mut self, bits: SelectionBits) -> Self {
        self.selection = Some(bits);
        self
    }

    pub fn cluster_renderer<R: ClusterRenderer + 'static>(mut self, renderer: R) -> Self {
        self.cluster_renderer = Some(Box::new(renderer));
        self
    }

    pub fn heatmap_renderer<R: HeatmapRenderer + 'static>(mut self, renderer: R) -> Self {
        self.heatmap_renderer = Some(Box::new(renderer));
        self
    }

    /// Build the session. Nothing is loaded until [`Session::start`] or the
    /// first event.
    pub fn build(self) -> Result<Session<S>> {
        self.config.validate().map_err(LayersError::InvalidConfig)?;

        let tree = Arc::new(self.config.category_tree()?);
        let selection = match &self.selection {
            Some(bits) => SelectionState::from_bits(tree.clone(), bits)?,
            None => SelectionState::new(tree.clone()),
        };
        let gradient = self.config.gradient_config()?;
        let heatmap = HeatmapSink::new(gradient, self.config.slices.initial);
        let loader = DatasetLoader::new(
            self.store,
            self.config.resources.clone(),
            self.config.slices.prefix.clone(),
        );

        log::debug!(
            "Built session: {} categories, {} bound resources, slices {}..={}",
            tree.total_categories(),
            self.config.resources.len(),
            self.config.slices.min,
            self.config.slices.max
        );

        Ok(Session {
            config: self.config,
            tree,
            selection,
            loader,
            clusters: ClusterSink::new(),
            heatmap,
            cluster_renderer: self.cluster_renderer,
            heatmap_renderer: self.heatmap_renderer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SessionMode, SliceConfig};
    use crate::storage::MemoryStore;
    use geolayers_types::dataset::Dataset;
    use geolayers_types::gradient::GradientSpec;
    use geolayers_types::point::LabeledPoint;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Screen {
        items: Vec<LabeledPoint>,
        heatmap_points: Option<usize>,
        heatmap_replacements: usize,
        clears: usize,
    }

    #[derive(Clone, Default)]
    struct SharedScreen(Rc<RefCell<Screen>>);

    impl ClusterRenderer for SharedScreen {
        fn clear_items(&mut self) {
            let mut screen = self.0.borrow_mut();
            screen.items.clear();
            screen.clears += 1;
        }

        fn add_items(&mut self, items: &[LabeledPoint]) {
            self.0.borrow_mut().items.extend_from_slice(items);
        }
    }

    impl HeatmapRenderer for SharedScreen {
        fn replace_heatmap(&mut self, points: &Dataset, _gradient: &GradientSpec) {
            let mut screen = self.0.borrow_mut();
            screen.heatmap_points = Some(points.len());
            screen.heatmap_replacements += 1;
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with("pub0", r#"[{"lat": 59.93, "lng": 30.33}]"#)
            .with("pub1", r#"[{"lat": 59.94, "lng": 30.34}, {"lat": 59.95, "lng": 30.35}]"#)
            .with("d2010", r#"[{"lat": 59.9, "lng": 30.3, "weight": 2}]"#)
            .with("d2013", r#"[{"lat": 59.9, "lng": 30.3}, {"lat": 59.8, "lng": 30.2}]"#)
    }

    #[test]
    fn test_builder_default_config() {
        let session = SessionBuilder::new(store()).build().unwrap();
        assert_eq!(session.mode(), SessionMode::Combined);
        assert_eq!(session.tree().total_categories(), 25);
        assert_eq!(session.encode_selection().count_ones(), 0);
        assert!(session.active_slice().is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = SessionConfig::empty().with_slices(SliceConfig {
            initial: 20,
            ..SliceConfig::default()
        });
        let err = SessionBuilder::new(store()).config(config).build().unwrap_err();
        assert!(matches!(err, LayersError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_restores_selection() {
        let session = SessionBuilder::new(store()).build().unwrap();
        let mut bits = SelectionBits::zeros(session.tree().total_categories());
        bits.set(session.tree().position("cafe").unwrap(), true);

        let restored = SessionBuilder::new(store()).selection(bits).build().unwrap();
        assert!(restored.selection().current("cafe").unwrap());
        assert!(!restored.selection().current("pub").unwrap());

        let wrong_width = SelectionBits::zeros(3);
        assert!(
            SessionBuilder::new(store())
                .selection(wrong_width)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_session_start_and_events() {
        let screen = SharedScreen::default();
        let mut session = SessionBuilder::new(store())
            .cluster_renderer(screen.clone())
            .heatmap_renderer(screen.clone())
            .build()
            .unwrap();

        session.start();
        assert_eq!(session.active_slice(), Some(0));
        assert_eq!(screen.0.borrow().heatmap_points, Some(1));
        assert!(screen.0.borrow().items.is_empty());

        let report = session.toggle("pub").unwrap().unwrap();
        // pub0 and pub1 load; club and nightclub have no stored resources
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(screen.0.borrow().items.len(), 3);

        session.set_pending_slice(2);
        session.set_pending_slice(3);
        assert_eq!(screen.0.borrow().heatmap_replacements, 1);

        assert_eq!(session.commit_slice().unwrap(), Some(3));
        assert_eq!(screen.0.borrow().heatmap_points, Some(2));
        assert_eq!(screen.0.borrow().heatmap_replacements, 2);
        // combined mode re-pushes the clusters after the heatmap
        assert_eq!(screen.0.borrow().items.len(), 3);
    }

    #[test]
    fn test_session_unknown_category_changes_nothing() {
        let screen = SharedScreen::default();
        let mut session = SessionBuilder::new(store())
            .cluster_renderer(screen.clone())
            .build()
            .unwrap();
        session.start();
        let clears = screen.0.borrow().clears;

        assert!(matches!(
            session.toggle("casino"),
            Err(LayersError::UnknownCategory(_))
        ));
        assert_eq!(screen.0.borrow().clears, clears);
        assert_eq!(session.encode_selection().count_ones(), 0);
    }

    #[test]
    fn test_heatmap_mode_skips_clusters() {
        let config = SessionConfig::default().with_mode(SessionMode::Heatmap);
        let mut session = SessionBuilder::new(store()).config(config).build().unwrap();
        session.start();

        assert!(session.toggle("cafe").unwrap().is_none());
        assert!(session.selection().current("cafe").unwrap());
        assert!(session.cluster_items().is_empty());
        assert_eq!(session.weighted_result().total_weight(), 2.0);
    }

    #[test]
    fn test_cluster_mode_does_not_load_slices() {
        let config = SessionConfig::default().with_mode(SessionMode::Cluster);
        let mut session = SessionBuilder::new(store()).config(config).build().unwrap();
        session.start();
        assert!(session.active_slice().is_none());

        session.toggle("cafe").unwrap();
        assert_eq!(session.cluster_items().len(), 2);

        session.set_pending_slice(3);
        assert_eq!(session.commit_slice().unwrap(), None);
        assert!(session.active_slice().is_none());
        assert!(session.weighted_result().is_empty());
    }
}
