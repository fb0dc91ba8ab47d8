//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Each test gets a temporary database on the shared cluster with the
//! embedded migrations applied. When the cluster cannot start, the
//! `SKIP_TEST_CLUSTER` policy decides between skipping and failing.

use std::thread;
use std::time::Duration;

use campus_records::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Password pinned for the embedded cluster so a reused data directory keeps
/// accepting connections across test binaries.
const EMBEDDED_PASSWORD: &str = "campus_embedded_test";

/// Returns the process-wide cluster, retrying transient bootstrap failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _password = std::env::var_os("PG_PASSWORD")
        .is_none()
        .then(|| env_lock::lock_env([("PG_PASSWORD", Some(EMBEDDED_PASSWORD))]));

    let mut attempt = 1;
    loop {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!(
                    "pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed, retrying: {error:?}"
                );
                thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

/// Creates a fresh database and runs the campus migrations against it.
pub fn provision_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster()?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("create database: {err:?}"))?;
    runtime
        .block_on(run_migrations(database.url()))
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}

/// True when `SKIP_TEST_CLUSTER` is "1", "true" or "yes" (any case).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skips with a marker when the policy allows it, otherwise fails loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a `postgres` error with its SQLSTATE and detail when present.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Counts rows in `table` over a direct connection, bypassing the pool.
pub fn count_rows(database_url: &str, table: &str) -> i64 {
    let mut client = Client::connect(database_url, NoTls)
        .unwrap_or_else(|err| panic!("connect postgres: {}", format_postgres_error(&err)));
    client
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .unwrap_or_else(|err| panic!("count {table}: {}", format_postgres_error(&err)))
        .get::<_, i64>(0)
}
