//! Chart rendering into a scratch directory.

use crud_benchmarks::report::{size_file, ChartRenderer, TREND_FILE};
use crud_benchmarks::schema::{BackendTimings, SizeResult};

fn result(size: usize, scale: u64) -> SizeResult {
    SizeResult {
        size,
        relational: BackendTimings {
            backend: "postgres".into(),
            create_ms: 40 * scale,
            read_ms: 25 * scale,
            update_ms: 30 * scale,
            delete_ms: 20 * scale,
            failures: 0,
        },
        key_value: BackendTimings {
            backend: "redis".into(),
            create_ms: 8 * scale,
            read_ms: 5 * scale,
            update_ms: 6 * scale,
            delete_ms: 4 * scale,
            failures: 0,
        },
    }
}

#[test]
fn one_chart_per_size_plus_trend() {
    let dir = tempfile::tempdir().unwrap();
    let matrix = vec![result(100, 1), result(1_000, 10), result(10_000, 100)];

    let written = ChartRenderer::new(dir.path()).render(&matrix).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "crud_times_100.svg",
            "crud_times_1000.svg",
            "crud_times_10000.svg",
            TREND_FILE,
        ]
    );
    for path in &written {
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.starts_with("<svg") || svg.contains("<svg"), "{}", path.display());
    }
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("charts");

    ChartRenderer::new(&nested).render(&vec![result(100, 1)]).unwrap();

    assert!(nested.join(size_file(100)).is_file());
    assert!(nested.join(TREND_FILE).is_file());
}

#[test]
fn legends_name_both_backends() {
    let dir = tempfile::tempdir().unwrap();
    ChartRenderer::new(dir.path())
        .render(&vec![result(500, 1)])
        .unwrap();

    let svg = std::fs::read_to_string(dir.path().join(size_file(500))).unwrap();
    assert!(svg.contains("postgres"));
    assert!(svg.contains("redis"));
}

#[test]
fn zero_timings_still_render() {
    let dir = tempfile::tempdir().unwrap();
    let mut empty = result(10, 0);
    empty.relational.failures = 10;

    let written = ChartRenderer::new(dir.path()).render(&vec![empty]).unwrap();
    assert_eq!(written.len(), 2);
}

#[test]
fn empty_matrix_writes_only_the_trend() {
    let dir = tempfile::tempdir().unwrap();
    let written = ChartRenderer::new(dir.path()).render(&Vec::new()).unwrap();
    assert_eq!(written, vec![dir.path().join(TREND_FILE)]);
}
