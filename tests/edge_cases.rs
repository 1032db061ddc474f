use geolayers::prelude::*;
use geolayers::{HeatmapSink, SliceConfig};
use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Default)]
struct HeatmapLog(Rc<RefCell<Vec<(usize, u32)>>>);

impl HeatmapRenderer for HeatmapLog {
    fn replace_heatmap(&mut self, points: &Dataset, gradient: &GradientSpec) {
        self.0.borrow_mut().push((points.len(), gradient.radius));
    }
}

fn slices() -> MemoryStore {
    MemoryStore::new()
        .with("d2010", r#"[{"lat": 59.9, "lng": 30.3}]"#)
        .with("d2012", r#"[{"lat": 59.9, "lng": 30.3}, {"lat": 59.91, "lng": 30.31}]"#)
        .with(
            "d2015",
            r#"[{"lat": 59.9, "lng": 30.3}, {"lat": 59.91, "lng": 30.31}, {"lat": 59.92, "lng": 30.32}]"#,
        )
        .with("d2017", r#"{"not": "a point list"}"#)
}

fn heatmap_session(log: &HeatmapLog) -> Session<MemoryStore> {
    SessionBuilder::new(slices())
        .config(SessionConfig::amenities().with_mode(SessionMode::Heatmap))
        .heatmap_renderer(log.clone())
        .build()
        .unwrap()
}

#[test]
fn test_drag_without_release_keeps_committed_slice() {
    init_logging();
    let log = HeatmapLog::default();
    let mut session = heatmap_session(&log);
    session.start();

    session.set_pending_slice(2);
    session.commit_slice().unwrap();
    assert_eq!(session.weighted_result().len(), 2);

    session.set_pending_slice(5);
    assert_eq!(session.pending_slice(), 5);
    assert_eq!(session.active_slice(), Some(2));
    assert_eq!(session.weighted_result().len(), 2);
    assert_eq!(log.0.borrow().len(), 2);

    session.commit_slice().unwrap();
    assert_eq!(session.active_slice(), Some(5));
    assert_eq!(session.weighted_result().len(), 3);
    assert_eq!(log.0.borrow().last(), Some(&(3, 40)));
}

#[test]
fn test_missing_slice_commits_empty_heatmap() {
    init_logging();
    let log = HeatmapLog::default();
    let mut session = heatmap_session(&log);
    session.start();

    session.set_pending_slice(3);
    assert_eq!(session.commit_slice().unwrap(), Some(3));
    assert!(session.weighted_result().is_empty());
    assert_eq!(log.0.borrow().last(), Some(&(0, 40)));
}

#[test]
fn test_malformed_slice_keeps_previous_heatmap() {
    init_logging();
    let log = HeatmapLog::default();
    let mut session = heatmap_session(&log);
    session.start();

    session.set_pending_slice(7);
    let err = session.commit_slice().unwrap_err();
    assert!(matches!(err, LayersError::MalformedData { .. }));
    assert!(err.is_recoverable());
    assert_eq!(session.active_slice(), Some(0));
    assert_eq!(session.weighted_result().len(), 1);
    assert_eq!(log.0.borrow().len(), 1);
}

#[test]
fn test_per_slice_gradient_override() {
    init_logging();
    let log = HeatmapLog::default();
    let config = SessionConfig::amenities()
        .with_mode(SessionMode::Heatmap)
        .with_gradient_override(5, GradientSpec::new(15, 0.6, geolayers::gradient::blue_red_ramp()));
    let mut session = SessionBuilder::new(slices())
        .config(config)
        .heatmap_renderer(log.clone())
        .build()
        .unwrap();
    session.start();

    session.set_pending_slice(5);
    session.commit_slice().unwrap();
    assert_eq!(log.0.borrow().last(), Some(&(3, 15)));
    assert_eq!(session.heatmap().current_gradient().unwrap().opacity, 0.6);
}

#[test]
fn test_shifted_slice_range() {
    init_logging();
    let config = SessionConfig::amenities().with_slices(SliceConfig {
        prefix: "year".to_string(),
        min: 15,
        max: 17,
        initial: 15,
    });
    let store = MemoryStore::new().with("year16", r#"[{"lat": 1.0, "lng": 2.0}]"#);
    let mut session = SessionBuilder::new(store).config(config).build().unwrap();
    session.start();
    assert_eq!(session.active_slice(), Some(15));
    assert!(session.weighted_result().is_empty());

    session.set_pending_slice(16);
    session.commit_slice().unwrap();
    assert_eq!(session.weighted_result().len(), 1);

    session.set_pending_slice(14);
    assert!(matches!(
        session.commit_slice(),
        Err(LayersError::OutOfRange { index: 14, min: 15, max: 17 })
    ));
}

#[test]
fn test_heatmap_sink_before_first_commit() {
    init_logging();
    let config = SessionConfig::empty();
    let sink = HeatmapSink::new(config.gradient_config().unwrap(), 0);
    assert!(sink.active_index().is_none());
    assert!(sink.current_gradient().is_none());
    assert!(sink.current_weighted_result().is_empty());
}

#[test]
fn test_toggle_every_parent_selects_every_leaf() {
    init_logging();
    let mut session = SessionBuilder::new(MemoryStore::new()).build().unwrap();
    let parents: Vec<CategoryId> = session.tree().parents().map(|n| n.id.clone()).collect();
    for parent in &parents {
        session.toggle(parent).unwrap();
    }
    let total = session.tree().total_categories();
    assert_eq!(session.encode_selection().count_ones(), total);
    for parent in &parents {
        assert!(session.selection().is_fully_selected(parent).unwrap());
    }

    // nothing stored, so every selected leaf is skipped
    assert!(session.cluster_items().is_empty());
}

#[cfg(feature = "geojson")]
#[test]
fn test_geojson_resources_from_directory() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pub1.geojson"),
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Cafe Singer"},
                 "geometry": {"type": "Point", "coordinates": [30.3351, 59.9343]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiPoint", "coordinates": [[30.31, 59.93], [30.32, 59.94]]}}
            ]
        }"#,
    )
    .unwrap();

    let mut session = SessionBuilder::new(DirectoryStore::new(dir.path()))
        .config(SessionConfig::amenities().with_mode(SessionMode::Cluster))
        .build()
        .unwrap();
    session.toggle("cafe").unwrap();

    let items = session.cluster_items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].point.lat, 59.9343);
    assert_eq!(items[0].point.lng, 30.3351);
    assert!(items.iter().all(|item| item.category.as_str() == "cafe"));
}
