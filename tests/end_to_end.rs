//! One full size against both containers, through to rendered charts.
//!
//! Run: `cargo test --test end_to_end -- --ignored`

mod common;

use common::{start_postgres, start_redis};
use crud_benchmarks::backend::{Backend, PostgresBackend, RedisBackend};
use crud_benchmarks::report::ChartRenderer;
use crud_benchmarks::runner::Runner;

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn benchmark_one_size_and_render() {
    let (_pg, pg_config) = start_postgres().await;
    let (_redis, redis_config) = start_redis().await;

    let relational = PostgresBackend::connect(&pg_config, true).await.unwrap();
    let key_value = RedisBackend::connect(&redis_config, true).await.unwrap();
    let runner = Runner::new(relational, key_value, vec![100]);

    let matrix = runner.run().await.unwrap();
    assert_eq!(matrix.len(), 1);
    let result = &matrix[0];
    assert_eq!(result.size, 100);
    assert_eq!(result.relational.backend, "postgres");
    assert_eq!(result.key_value.backend, "redis");
    assert_eq!(result.relational.as_array().len(), 4);
    assert_eq!(result.relational.failures, 0);
    assert_eq!(result.key_value.failures, 0);

    assert_eq!(runner.relational().record_count().await.unwrap(), 0);
    assert_eq!(runner.key_value().record_count().await.unwrap(), 0);

    let dir = tempfile::tempdir().unwrap();
    let written = ChartRenderer::new(dir.path()).render(&matrix).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|p| p.is_file()));
}
