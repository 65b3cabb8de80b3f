//! Integration tests for `DieselUserRepository` against embedded PostgreSQL.
//!
//! Each test provisions a migrated temporary database on the shared cluster
//! and drives the repository through a dedicated Tokio runtime, keeping the
//! blocking cluster bootstrap outside of async code.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use user_service::domain::ports::{UserPersistenceError, UserRepository};
use user_service::domain::{NewUser, Page, Password, UserChanges, UserId};
use user_service::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

mod support;

use support::{drop_users_table, handle_cluster_setup_failure, provision_database};

struct TestContext {
    runtime: Runtime,
    repository: DieselUserRepository,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database()?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselUserRepository::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn draft(name: &str) -> NewUser {
    NewUser {
        name: name.to_owned(),
        surname: "Lovelace".to_owned(),
        password: Password::new("secret"),
    }
}

#[rstest]
fn insert_assigns_id_and_timestamps(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;

    let created = ctx
        .runtime
        .block_on(repo.insert(&draft("Ada")))
        .expect("insert succeeds");

    assert!(created.id.get() > 0);
    assert_eq!(created.name, "Ada");
    assert_eq!(created.password.expose(), "secret");
    assert_eq!(created.created_at, created.updated_at);

    let fetched = ctx
        .runtime
        .block_on(repo.find_by_id(created.id))
        .expect("find succeeds");
    assert_eq!(fetched, Some(created));
}

#[rstest]
fn find_missing_returns_none(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let fetched = ctx
        .runtime
        .block_on(ctx.repository.find_by_id(UserId::new(999_999)))
        .expect("find succeeds");
    assert!(fetched.is_none());
}

#[rstest]
fn list_orders_by_id_and_applies_window(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;

    let ids: Vec<i64> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| {
            ctx.runtime
                .block_on(repo.insert(&draft(name)))
                .expect("insert succeeds")
                .id
                .get()
        })
        .collect();

    let page = ctx
        .runtime
        .block_on(repo.list(Page::new(Some(1), Some(2))))
        .expect("list succeeds");
    let listed: Vec<i64> = page.iter().map(|user| user.id.get()).collect();
    assert_eq!(listed, ids[1..3].to_vec());

    let beyond = ctx
        .runtime
        .block_on(repo.list(Page::new(Some(10), None)))
        .expect("list succeeds");
    assert!(beyond.is_empty());
}

#[rstest]
fn update_writes_only_supplied_fields(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;
    let created = ctx
        .runtime
        .block_on(repo.insert(&draft("Ada")))
        .expect("insert succeeds");

    let changes = UserChanges {
        surname: Some("King".to_owned()),
        ..UserChanges::default()
    };
    let updated = ctx
        .runtime
        .block_on(repo.update(created.id, &changes))
        .expect("update succeeds")
        .expect("row exists");

    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.surname, "King");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[rstest]
fn empty_update_returns_current_row(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;
    let created = ctx
        .runtime
        .block_on(repo.insert(&draft("Ada")))
        .expect("insert succeeds");

    let unchanged = ctx
        .runtime
        .block_on(repo.update(created.id, &UserChanges::default()))
        .expect("update succeeds");
    assert_eq!(unchanged, Some(created));
}

#[rstest]
fn update_and_delete_report_missing_rows(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;
    let missing = UserId::new(424_242);
    let changes = UserChanges {
        name: Some("Nobody".to_owned()),
        ..UserChanges::default()
    };

    let updated = ctx
        .runtime
        .block_on(repo.update(missing, &changes))
        .expect("update succeeds");
    assert!(updated.is_none());

    let removed = ctx
        .runtime
        .block_on(repo.delete(missing))
        .expect("delete succeeds");
    assert!(!removed);
}

#[rstest]
fn delete_removes_row(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repo = &ctx.repository;
    let created = ctx
        .runtime
        .block_on(repo.insert(&draft("Ada")))
        .expect("insert succeeds");

    assert!(ctx.runtime.block_on(repo.delete(created.id)).expect("delete succeeds"));
    assert!(
        ctx.runtime
            .block_on(repo.find_by_id(created.id))
            .expect("find succeeds")
            .is_none()
    );
}

#[rstest]
fn missing_table_surfaces_query_error(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    drop_users_table(&ctx.database_url).expect("drop users table");

    let err = ctx
        .runtime
        .block_on(ctx.repository.list(Page::default()))
        .expect_err("query should fail");
    assert!(matches!(err, UserPersistenceError::Query { .. }));
}
