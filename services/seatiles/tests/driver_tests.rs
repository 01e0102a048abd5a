//! Product/day driver tests against a temporary data and tile tree.

use chrono::{Days, NaiveDate};
use seatiles::loader::grid_path;
use seatiles::{
    backfill, last_days, process_all, process_grid_file, process_product, tiles_exist, today_utc, DateInFuture,
    Product, ProductOutcome, SeatilesConfig,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use test_utils::fixtures::{config, grids};
use test_utils::temp_test_dir;
use tile_common::{tiles_for_bbox, BoundingBox};

struct Workspace {
    _dir: TempDir,
    config: SeatilesConfig,
}

fn workspace() -> Workspace {
    let dir = temp_test_dir();
    let tile_dir = dir.path().join("tiles");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&tile_dir).unwrap();
    fs::create_dir_all(&data_dir).unwrap();

    let yaml = config::MINIMAL_YAML
        .replace("{tile_dir}", tile_dir.to_str().unwrap())
        .replace("{data_dir}", data_dir.to_str().unwrap());
    let config = SeatilesConfig::from_yaml_str(&yaml).unwrap();
    config.validate().unwrap();
    Workspace { _dir: dir, config }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 8).unwrap()
}

fn put_grid(config: &SeatilesConfig, product: Product, text: &str) {
    put_grid_on(config, product, day(), text);
}

fn put_grid_on(config: &SeatilesConfig, product: Product, date: NaiveDate, text: &str) {
    let path = grid_path(&config.data_dir, product, date);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .map(|p| if p.is_dir() { count_files(&p) } else { 1 })
        .sum()
}

#[test]
fn test_renders_every_tile_of_the_grid_extent() {
    let ws = workspace();
    put_grid(&ws.config, Product::Ssh, grids::SMALL_AXES_JSON);

    let outcome = process_product(&ws.config, Product::Ssh, day(), false).unwrap();
    let summary = outcome.summary().expect("rendered");

    let extent = BoundingBox::new(-70.0, -50.0, -10.0, -10.0);
    let expected: usize = ws
        .config
        .zoom_levels
        .iter()
        .map(|&z| tiles_for_bbox(&extent, z).unwrap().len())
        .sum();
    assert_eq!(summary.file_count(), expected);
    assert_eq!(summary.failure_count(), 0);

    let root = ws.config.tile_dir.join("ssh").join("2026-01-08");
    assert_eq!(count_files(&root), expected);
    assert!(root.join("0/0/0.png").is_file());
    assert!(tiles_exist(&ws.config.tile_dir, Product::Ssh, day()));
}

#[test]
fn test_existing_day_skipped_unless_forced() {
    let ws = workspace();
    put_grid(&ws.config, Product::Ssh, grids::SMALL_AXES_JSON);

    process_product(&ws.config, Product::Ssh, day(), false).unwrap();
    assert!(matches!(
        process_product(&ws.config, Product::Ssh, day(), false).unwrap(),
        ProductOutcome::AlreadyExists
    ));
    assert!(matches!(
        process_product(&ws.config, Product::Ssh, day(), true).unwrap(),
        ProductOutcome::Rendered(_)
    ));
}

#[test]
fn test_missing_grid_skips_product() {
    let ws = workspace();
    let outcome = process_product(&ws.config, Product::Globcolour, day(), false).unwrap();
    assert!(matches!(outcome, ProductOutcome::Skipped(_)));
    assert!(!tiles_exist(&ws.config.tile_dir, Product::Globcolour, day()));
}

#[test]
fn test_grid_outside_cruise_area_skips_product() {
    let ws = workspace();
    put_grid(
        &ws.config,
        Product::Ostia,
        r#"{"lat": [10.0, 20.0], "lon": [100.0, 110.0, 120.0], "values": [[290, 291, 292], [293, 294, 295]]}"#,
    );

    match process_product(&ws.config, Product::Ostia, day(), false).unwrap() {
        ProductOutcome::Skipped(reason) => assert!(reason.contains("does not cover")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!tiles_exist(&ws.config.tile_dir, Product::Ostia, day()));
}

#[test]
fn test_corrupt_grid_retried_then_fails() {
    let ws = workspace();
    put_grid(&ws.config, Product::Ssh, "{ not json");
    let path = grid_path(&ws.config.data_dir, Product::Ssh, day());

    let mut sleeps: Vec<Duration> = Vec::new();
    let result = process_grid_file(&ws.config, Product::Ssh, day(), false, &path, |d| sleeps.push(d));

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("after 4 attempts"));
    assert_eq!(sleeps.len(), 3);
}

#[test]
fn test_explicit_grid_file_with_mesh_layout() {
    let ws = workspace();
    let path = ws.config.data_dir.join("custom.json");
    fs::write(&path, grids::SMALL_MESH_JSON).unwrap();

    let outcome = process_grid_file(&ws.config, Product::Gebco, day(), false, &path, |_| {}).unwrap();
    assert!(matches!(outcome, ProductOutcome::Rendered(_)));
    assert!(ws.config.tile_dir.join("gebco/2026-01-08/0/0/0.png").is_file());
}

#[test]
fn test_process_all_isolates_products() {
    let ws = workspace();
    put_grid(&ws.config, Product::Ssh, grids::SMALL_AXES_JSON);

    let results = process_all(&ws.config, day(), false);
    let products: Vec<Product> = results.iter().map(|(p, _)| *p).collect();
    assert_eq!(products, Product::DAILY.to_vec());

    for (product, outcome) in results {
        let outcome = outcome.unwrap();
        match product {
            Product::Ssh => assert!(matches!(outcome, ProductOutcome::Rendered(_))),
            _ => assert!(matches!(outcome, ProductOutcome::Skipped(_))),
        }
    }
}

fn future_day() -> NaiveDate {
    today_utc().checked_add_days(Days::new(2)).unwrap()
}

#[test]
fn test_future_day_rejected() {
    let ws = workspace();
    let date = future_day();
    put_grid_on(&ws.config, Product::Ssh, date, grids::SMALL_AXES_JSON);

    let err = process_product(&ws.config, Product::Ssh, date, true).unwrap_err();
    let future = err.downcast_ref::<DateInFuture>().expect("typed future-date error");
    assert_eq!(future.date, date);
    assert!(!tiles_exist(&ws.config.tile_dir, Product::Ssh, date));

    for (_, outcome) in process_all(&ws.config, date, false) {
        assert!(outcome.unwrap_err().downcast_ref::<DateInFuture>().is_some());
    }
}

#[test]
fn test_backfill_covers_every_day() {
    let ws = workspace();
    let from = day().checked_sub_days(Days::new(2)).unwrap();
    put_grid_on(&ws.config, Product::Ssh, from, grids::SMALL_AXES_JSON);
    put_grid(&ws.config, Product::Ssh, grids::SMALL_AXES_JSON);

    let days = backfill(&ws.config, from, day(), false).unwrap();
    let dates: Vec<NaiveDate> = days.iter().map(|(d, _)| *d).collect();
    assert_eq!(dates, vec![from, from.succ_opt().unwrap(), day()]);

    for (date, report) in days {
        assert_eq!(report.len(), Product::DAILY.len());
        let ssh = report
            .into_iter()
            .find(|(p, _)| *p == Product::Ssh)
            .map(|(_, outcome)| outcome.unwrap())
            .unwrap();
        if date == from || date == day() {
            assert!(matches!(ssh, ProductOutcome::Rendered(_)), "{date}");
        } else {
            assert!(matches!(ssh, ProductOutcome::Skipped(_)), "{date}");
        }
    }
    assert!(tiles_exist(&ws.config.tile_dir, Product::Ssh, from));
    assert!(tiles_exist(&ws.config.tile_dir, Product::Ssh, day()));
}

#[test]
fn test_backfill_rejects_future_or_inverted_range() {
    let ws = workspace();
    let err = backfill(&ws.config, day(), future_day(), false).unwrap_err();
    assert!(err.downcast_ref::<DateInFuture>().is_some());
    assert!(!ws.config.tile_dir.join("ssh").exists());

    let before = day().checked_sub_days(Days::new(1)).unwrap();
    assert!(backfill(&ws.config, day(), before, false).is_err());
}

#[test]
fn test_last_days_runs_through_today() {
    let days = last_days(day(), 7);
    assert_eq!(days.len(), 8);
    assert_eq!(days.first(), Some(&NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    assert_eq!(days.last(), Some(&day()));
    assert_eq!(last_days(day(), 0), vec![day()]);
}
