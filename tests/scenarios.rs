//! End-to-end scenarios over the public API: profile store -> rating ->
//! design point -> simulation.

use indicatif::ProgressBar;
use reach_rs::config::{ColumnConfig, RatingOptions, SchemeKind, SimulationConfig};
use reach_rs::io::sqlite;
use reach_rs::profile::{CrossSectionPoint, CrossSectionProfile};
use reach_rs::rating::{default_design_point, generate_rating, manning_discharge};
use reach_rs::solver::{self, NodeJob};
use reach_rs::{ResultSource, compute_geometry};
use std::sync::Arc;

#[test]
fn rectangular_channel_hand_calculation() {
    // 5 m wide, 2 m deep, water 1 m above the invert
    let profile = CrossSectionProfile::rectangular(5.0, 2.0).with_manning_n(0.03);
    let geom = compute_geometry(&profile.points, -1.0);

    assert!((geom.area - 5.0).abs() < 1e-9);
    assert!((geom.wetted_perimeter - 7.0).abs() < 1e-9);
    assert!((geom.top_width - 5.0).abs() < 1e-9);

    let r = geom.area / geom.wetted_perimeter;
    let hand = (1.0 / 0.03) * 5.0 * r.powf(2.0 / 3.0) * 0.001f64.sqrt();
    let q = manning_discharge(1.0, 0.03, &geom, 0.001);
    assert!((q - hand).abs() < 1e-12);
    assert!((q - 4.2).abs() < 0.05);
}

#[test]
fn profile_above_water_is_dry() {
    let points = vec![
        CrossSectionPoint::new(0.0, 12.0),
        CrossSectionPoint::new(3.0, 10.5),
        CrossSectionPoint::new(6.0, 11.0),
    ];
    let geom = compute_geometry(&points, 10.0);
    assert_eq!(geom.area, 0.0);
    assert_eq!(geom.top_width, 0.0);
    assert_eq!(geom.wetted_perimeter, 0.0);
}

#[test]
fn natural_section_rating_is_well_formed() {
    let profile = CrossSectionProfile::new(vec![
        CrossSectionPoint::new(0.0, 104.2),
        CrossSectionPoint::new(3.5, 101.8),
        CrossSectionPoint::new(7.0, 100.1),
        CrossSectionPoint::new(9.5, 99.6),
        CrossSectionPoint::new(12.0, 100.4),
        CrossSectionPoint::new(18.0, 102.9),
        CrossSectionPoint::new(22.0, 104.0),
    ])
    .with_manning_n(0.04);

    let rating = generate_rating(&profile, &RatingOptions::new(25, 0.0008).unwrap());
    assert_eq!(rating.len(), 25);
    assert!(rating.windows(2).all(|w| w[1].water_level > w[0].water_level));
    assert!(rating.windows(2).all(|w| w[1].discharge >= w[0].discharge));
    assert!(rating.iter().all(|p| p.discharge >= 0.0 && p.discharge.is_finite()));
    assert!((rating[24].water_level - 104.2).abs() < 1e-9);
}

#[test]
fn design_point_from_store_seeds_simulation() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    let columns = ColumnConfig::new();
    sqlite::init_schema(&conn, &columns).unwrap();

    let profile = CrossSectionProfile::trapezoidal(6.0, 2.5, 2.0, true).with_manning_n(0.032);
    sqlite::save_cross_section(&mut conn, &columns, "demo", "reach-1", &profile).unwrap();

    let stored = sqlite::load_cross_section(&conn, &columns, "demo", "reach-1")
        .unwrap()
        .unwrap();
    let rating = generate_rating(&stored, &RatingOptions::default());
    let design = default_design_point(&rating).unwrap();
    assert!(sqlite::save_design_point(&conn, &columns, "demo", "reach-1", &design).unwrap());

    let stored = sqlite::load_cross_section(&conn, &columns, "demo", "reach-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.design_water_level, Some(design.water_level));

    let config = SimulationConfig {
        total_steps: 1,
        inflow: 5.0,
        downstream_stage: -2.5,
        ..SimulationConfig::default()
    };
    let result = solver::run(&config, Some(&stored));
    assert_eq!(result.source, ResultSource::Storage);
    assert_eq!(result.len(), 1);
    assert_eq!(result.points[0].time, 0.0);
    // no reference level, so the design level is the initial state
    assert_eq!(result.points[0].water_level, design.water_level);
}

#[test]
fn batch_over_stored_project() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    let columns = ColumnConfig::new();
    sqlite::init_schema(&conn, &columns).unwrap();

    let usable = CrossSectionProfile::rectangular(8.0, 3.0).with_manning_n(0.03);
    let no_roughness = CrossSectionProfile::rectangular(8.0, 3.0);
    sqlite::save_cross_section(&mut conn, &columns, "demo", "a", &usable).unwrap();
    sqlite::save_cross_section(&mut conn, &columns, "demo", "b", &no_roughness).unwrap();

    let config = SimulationConfig::from_toml_str(
        r#"
        time_step = 120.0
        total_steps = 40
        scheme_kind = "lax"
        inflow = 6.0
        downstream_stage = -3.0
        "#,
    )
    .unwrap();

    let jobs: Vec<NodeJob> = sqlite::list_nodes(&conn, &columns, "demo")
        .unwrap()
        .into_iter()
        .map(|node_id| {
            let profile = sqlite::load_cross_section(&conn, &columns, "demo", &node_id).unwrap();
            NodeJob { node_id, profile }
        })
        .collect();

    let pool = solver::build_thread_pool(Some(2)).unwrap();
    let results = pool.install(|| solver::run_batch(&config, &jobs, Arc::new(ProgressBar::hidden())));

    assert_eq!(results[0].0, "a");
    assert_eq!(results[0].1.source, ResultSource::Storage);
    assert_eq!(results[1].0, "b");
    assert_eq!(results[1].1.source, ResultSource::Fallback(SchemeKind::Lax));

    for (node, result) in &results {
        assert_eq!(result.len(), 40);
        sqlite::save_results(&mut conn, &columns, "demo", node, result).unwrap();
    }
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM simulation_results", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 80);
}
