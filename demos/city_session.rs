//! City Session Example
//!
//! Drives a combined cluster + heatmap session the way a map UI would:
//! checkbox clicks, a slider drag and a slider release.
//!
//! Pass a directory of `<key>.json` / `<key>.geojson` resources as the first
//! argument to load real data; without one a small in-memory city is used.
//! Run with `RUST_LOG=debug` to see loader and sink logging.

use geolayers::{
    ClusterRenderer, Dataset, DirectoryStore, GradientSpec, HeatmapRenderer, LabeledPoint,
    MemoryStore, ResourceStore, Session, SessionBuilder, SessionConfig,
};
use std::error::Error;

struct PrintingMap;

impl ClusterRenderer for PrintingMap {
    fn clear_items(&mut self) {
        println!("   [clusters] cleared");
    }

    fn add_items(&mut self, items: &[LabeledPoint]) {
        println!("   [clusters] {} items", items.len());
        for item in items.iter().take(3) {
            println!(
                "     {:<12} ({:.4}, {:.4})",
                item.category, item.point.lat, item.point.lng
            );
        }
    }
}

impl HeatmapRenderer for PrintingMap {
    fn replace_heatmap(&mut self, points: &Dataset, gradient: &GradientSpec) {
        println!(
            "   [heatmap] {} from {} points, total weight {:.1}, radius {}",
            points.source(),
            points.len(),
            points.total_weight(),
            gradient.radius
        );
    }
}

fn demo_store() -> MemoryStore {
    MemoryStore::new()
        .with(
            "pub1",
            r#"[{"lat": 59.9343, "lng": 30.3351}, {"lat": 59.9311, "lng": 30.3609}]"#,
        )
        .with("pub3", r#"[{"lat": 59.9386, "lng": 30.3141}]"#)
        .with("money0", r#"[{"lat": 59.9357, "lng": 30.3259}]"#)
        .with("money2", "[{\"lat\": 59.93")
        .with(
            "d2010",
            r#"[{"lat": 59.93, "lng": 30.33, "weight": 2.0}, {"lat": 59.95, "lng": 30.31}]"#,
        )
        .with(
            "d2014",
            r#"[{"lat": 59.94, "lng": 30.32, "weight": 5.0}, {"lat": 59.92, "lng": 30.35, "weight": 1.5}]"#,
        )
}

fn run<S: ResourceStore>(mut session: Session<S>) -> Result<(), Box<dyn Error>> {
    println!("1. Start");
    session.start();

    println!("\n2. Check 'pub'");
    let report = session.toggle("pub")?;
    if let Some(report) = report {
        for (category, error) in &report.skipped {
            println!("   skipped {}: {}", category, error);
        }
    }

    println!("\n3. Uncheck 'cafe', check 'money'");
    session.toggle("cafe")?;
    session.toggle("money")?;
    println!("   selection: {}", session.encode_selection());

    println!("\n4. Drag slider to 2, then 4, release");
    session.set_pending_slice(2);
    session.set_pending_slice(4);
    println!("   pending {}, active {:?}", session.pending_slice(), session.active_slice());
    session.commit_slice()?;

    println!("\n5. Release past the end of the slider");
    session.set_pending_slice(12);
    if let Err(e) = session.commit_slice() {
        println!("   rejected: {}", e);
    }

    println!("\n{:?}", session);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    println!("=== geolayers {} - City Session ===\n", geolayers::VERSION);

    let config = SessionConfig::amenities();
    match std::env::args().nth(1) {
        Some(dir) => {
            println!("Loading resources from {}\n", dir);
            let session = SessionBuilder::new(DirectoryStore::new(dir))
                .config(config)
                .cluster_renderer(PrintingMap)
                .heatmap_renderer(PrintingMap)
                .build()?;
            run(session)
        }
        None => {
            let session = SessionBuilder::new(demo_store())
                .config(config)
                .cluster_renderer(PrintingMap)
                .heatmap_renderer(PrintingMap)
                .build()?;
            run(session)
        }
    }
}
