//! Result matrix types and their JSON layout.

use crud_benchmarks::backend::Phase;
use crud_benchmarks::schema::{BackendTimings, BenchmarkReport, RunMetadata, SizeResult};

fn timings(backend: &str, values: [u64; 4]) -> BackendTimings {
    let mut t = BackendTimings::new(backend);
    for (phase, ms) in Phase::ALL.into_iter().zip(values) {
        t.set(phase, ms);
    }
    t
}

#[test]
fn phases_map_to_their_own_cells() {
    let t = timings("postgres", [10, 20, 30, 40]);
    assert_eq!(t.create_ms, 10);
    assert_eq!(t.read_ms, 20);
    assert_eq!(t.update_ms, 30);
    assert_eq!(t.delete_ms, 40);
    assert_eq!(t.get(Phase::Update), 30);
    assert_eq!(t.as_array(), [10, 20, 30, 40]);
}

#[test]
fn mean_is_over_four_phases() {
    let t = timings("redis", [1, 2, 3, 6]);
    assert_eq!(t.total_ms(), 12);
    assert!((t.mean_ms() - 3.0).abs() < f64::EPSILON);
}

#[test]
fn phase_labels_are_lowercase() {
    let labels: Vec<&str> = Phase::ALL.iter().map(|p| p.label()).collect();
    assert_eq!(labels, ["create", "read", "update", "delete"]);
    assert_eq!(serde_json::to_string(&Phase::Delete).unwrap(), "\"delete\"");
    assert_eq!(Phase::Read.to_string(), "read");
}

#[test]
fn report_json_layout() {
    let report = BenchmarkReport::new(
        RunMetadata::capture(true),
        vec![SizeResult {
            size: 100,
            relational: timings("postgres", [5, 4, 3, 2]),
            key_value: timings("redis", [1, 1, 1, 1]),
        }],
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["metadata"]["availability"], true);
    assert_eq!(json["results"][0]["size"], 100);
    assert_eq!(json["results"][0]["relational"]["backend"], "postgres");
    assert_eq!(json["results"][0]["relational"]["create_ms"], 5);
    assert_eq!(json["results"][0]["key_value"]["delete_ms"], 1);

    let parsed: BenchmarkReport = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.results, report.results);
}

#[test]
fn failures_default_when_absent() {
    let parsed: BackendTimings = serde_json::from_str(
        r#"{"backend":"redis","create_ms":1,"read_ms":2,"update_ms":3,"delete_ms":4}"#,
    )
    .unwrap();
    assert_eq!(parsed.failures, 0);
}
