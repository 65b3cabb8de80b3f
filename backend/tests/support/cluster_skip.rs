//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.

const SKIP_VAR: &str = "SKIP_TEST_CLUSTER";

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

/// Skip with a marker line when `SKIP_TEST_CLUSTER` is truthy, otherwise
/// panic.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    let skip = std::env::var(SKIP_VAR).is_ok_and(|value| is_truthy(value.trim()));
    if !skip {
        panic!("embedded PostgreSQL unavailable: {reason}; set {SKIP_VAR}=1 to skip");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}
