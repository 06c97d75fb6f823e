//! End-to-end tests: JSONL routes in, JSONL reports out

use route_audit::domain::{RouteChain, VisitRecord};
use route_audit::infra::{AuditMetrics, Config};
use route_audit::io::{ReportWriter, RouteReader};
use route_audit::services::{audit, run_batch, scenarios, InvalidRouteError, RouteVerdict};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn visits(pairs: &[(i64, i64)]) -> Vec<VisitRecord> {
    pairs.iter().copied().map(VisitRecord::from).collect()
}

#[test]
fn test_cyclic_ride() {
    let route = visits(&[
        (32144, 1685287960),
        (12345, 1685288260),
        (21341, 1685288560),
        (12345, 1685288860),
    ]);
    assert_eq!(audit(route), Ok(RouteVerdict::Revisited { total_revisit_secs: 600 }));
}

#[test]
fn test_non_cyclic_ride() {
    let route = visits(&[
        (12237, 1685287960),
        (32144, 1685288260),
        (21341, 1685288560),
        (12345, 1685288860),
    ]);
    assert_eq!(audit(route), Ok(RouteVerdict::NoCycle));
}

#[test]
fn test_back_in_time_variants() {
    let cases = [
        visits(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 3)]),
        visits(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (1, 1)]),
        visits(&[(1, 1), (2, 2), (3, 3), (1, 4), (5, 1)]),
    ];

    for route in cases {
        assert!(matches!(audit(route), Err(InvalidRouteError::OutOfOrder { .. })));
    }
}

#[test]
fn test_cyclic_ride_back_to_start() {
    let route = visits(&[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (1, 6)]);
    assert_eq!(audit(route).unwrap().total_revisit_time(), Some(5));
}

#[test]
fn test_chain_and_slice_agree() {
    let route = visits(&[(4, 10), (5, 20), (4, 35), (6, 40), (5, 41)]);
    let (chain, head) = RouteChain::from_visits(route.clone());

    assert_eq!(audit(chain.walk(head.unwrap())), audit(route));
}

#[test]
fn test_self_check_scenarios_pass() {
    let outcomes = scenarios::run_all().unwrap();
    assert!(outcomes.iter().all(|o| o.passed));
}

#[test]
fn test_file_to_file_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("routes.jsonl");
    let output = dir.path().join("out").join("reports.jsonl");

    fs::write(
        &input,
        concat!(
            r#"{"route_id": "r1", "driver": "ana", "visits": [[1, 1], [2, 2], [3, 3], [4, 4], [5, 5], [1, 6]]}"#,
            "\n",
            r#"{"route_id": "r2", "visits": [{"location_id": 1, "timestamp": 3}, {"location_id": 2, "timestamp": 2}]}"#,
            "\n",
        ),
    )
    .unwrap();

    let config = Config::default()
        .with_input_path(input.to_str().unwrap())
        .with_output_path(output.to_str().unwrap());

    let reader = RouteReader::open(config.input_path()).unwrap();
    let mut writer = ReportWriter::open(config.output_path()).unwrap();
    let summary = run_batch(reader, &mut writer, &config, Arc::new(AuditMetrics::new())).unwrap();
    drop(writer);

    assert_eq!(summary.routes_audited, 2);
    assert_eq!(summary.revisited, 1);
    assert_eq!(summary.out_of_order, 1);

    let content = fs::read_to_string(&output).unwrap();
    let reports: Vec<serde_json::Value> =
        content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["route_id"], "r1");
    assert_eq!(reports[0]["driver"], "ana");
    assert_eq!(reports[0]["total_revisit_secs"], 5);
    assert_eq!(reports[1]["status"], "invalid");
    assert_eq!(reports[1]["error_kind"], "out_of_order");
}
