mod common;

use geo::Area;
use openmander_engine::{Plan, SvgLayer};

fn plan() -> Plan {
    let mut plan = Plan::with_seed(common::uniform_grid(4, 4), 3, 21).unwrap();
    plan.randomize().unwrap();
    plan
}

#[test]
fn district_wkb_bundle_round_trips() {
    let plan = plan();
    let dir = tempfile::tempdir().unwrap();

    for compress in [false, true] {
        let path = dir.path().join(format!("districts-{compress}.wkb"));
        plan.write_district_wkb(&path, compress).unwrap();

        let read = Plan::read_district_wkb(&path).unwrap();
        let expected = plan.district_geometries();
        assert_eq!(read.len(), 3);
        for ((d, shape), (expected_d, expected_shape)) in read.iter().zip(&expected) {
            assert_eq!(d, expected_d);
            assert!((shape.unsigned_area() - expected_shape.unsigned_area()).abs() < 1e-12);
        }
    }
}

#[test]
fn svg_draws_one_path_per_district() {
    let plan = plan();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    plan.to_svg(&path, None).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert_eq!(svg.matches(r#"<path class="dist""#).count(), 3);
    assert_eq!(svg.matches(r#"<path class="unit""#).count(), 0);
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn svg_layers() {
    let plan = plan();

    let units = plan.to_svg_string(Some(&SvgLayer::Units)).unwrap();
    assert_eq!(units.matches(r#"<path class="unit""#).count(), 16);

    let partisan = SvgLayer::Partisan { dem_series: "dem".into(), rep_series: "rep".into() };
    let svg = plan.to_svg_string(Some(&partisan)).unwrap();
    assert_eq!(svg.matches("fill:rgb(").count(), 3);

    let missing = SvgLayer::Partisan { dem_series: "dem".into(), rep_series: "green".into() };
    let err = plan.to_svg_string(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("[Plan.to_svg]"));
}

#[test]
fn csv_lists_every_unit() {
    let plan = plan();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.csv");
    plan.to_csv(&path).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "geo_id,district");
    assert_eq!(lines.len(), 17);

    let assignments = plan.assignments().unwrap();
    for (line, (geo_id, district)) in lines[1..].iter().zip(plan.units().geo_ids().iter().zip(&assignments)) {
        assert_eq!(*line, format!("{geo_id},{district}"));
    }
}

#[test]
fn csv_needs_a_full_assignment() {
    let plan = Plan::with_seed(common::uniform_grid(2, 2), 2, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    assert!(plan.to_csv(&dir.path().join("empty.csv")).is_err());
}
