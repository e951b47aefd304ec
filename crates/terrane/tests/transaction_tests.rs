//! Integration tests for optimistic transactions: visibility, snapshots,
//! conflicts, rollback reuse, and the scoped closure form.

use terrane::{Database, Environment, Error, Field, Schema, Value};

fn string_env() -> (Environment, Database) {
    let env = Environment::in_memory();
    let db = env
        .add_database(
            "main",
            Schema::new(vec![Field::string()], vec![Field::string()]).expect("schema"),
        )
        .expect("add keyspace");
    env.open().expect("open");
    (env, db)
}

// ============================================================================
// Visibility and isolation
// ============================================================================

#[test]
fn writes_stay_buffered_until_commit() {
    let (env, db) = string_env();

    let txn = env.transaction();
    txn.database(&db).set("k1", "v1").unwrap();

    assert_eq!(db.try_get("k1").unwrap(), None);

    txn.commit().unwrap();
    assert_eq!(db.get("k1").unwrap(), vec![Value::from("v1")]);
}

#[test]
fn a_transaction_reads_its_own_writes() {
    let (env, db) = string_env();

    let txn = env.transaction();
    let view = txn.database(&db);
    view.set("k1", "v1").unwrap();
    assert_eq!(view.get("k1").unwrap(), vec![Value::from("v1")]);

    view.delete("k1").unwrap();
    assert_eq!(view.try_get("k1").unwrap(), None);
    txn.rollback().unwrap();
}

#[test]
fn reads_observe_the_snapshot_at_begin() {
    let (env, db) = string_env();
    db.set("stable", "before").unwrap();

    let txn = env.transaction();
    txn.begin().unwrap();

    db.set("stable", "after").unwrap();
    db.set("fresh", "new").unwrap();

    let view = txn.database(&db);
    assert_eq!(view.get("stable").unwrap(), vec![Value::from("before")]);
    assert_eq!(view.try_get("fresh").unwrap(), None);
    txn.rollback().unwrap();

    assert_eq!(db.get("stable").unwrap(), vec![Value::from("after")]);
}

#[test]
fn transactional_iteration_merges_buffered_writes() {
    let (env, db) = string_env();
    db.set("k0", "v0").unwrap();
    db.set("k2", "v2").unwrap();

    let txn = env.transaction();
    let view = txn.database(&db);
    view.set("k1", "v1").unwrap();
    view.delete("k2").unwrap();

    let keys: Vec<_> = view
        .keys()
        .unwrap()
        .map(|r| match &r.expect("key")[0] {
            Value::Str(s) => s.clone(),
            other => panic!("unexpected key {other:?}"),
        })
        .collect();
    assert_eq!(keys, vec!["k0", "k1"]);
    assert_eq!(view.len().unwrap(), 2);
    txn.rollback().unwrap();
}

// ============================================================================
// Commit, rollback, and reuse
// ============================================================================

#[test]
fn committing_an_unopened_transaction_is_a_noop() {
    let (env, _db) = string_env();
    let txn = env.transaction();
    txn.commit().unwrap();
}

#[test]
fn rollback_discards_buffered_writes() {
    let (env, db) = string_env();

    let txn = env.transaction();
    txn.database(&db).set("k1", "v1").unwrap();
    txn.rollback().unwrap();

    assert_eq!(db.try_get("k1").unwrap(), None);
}

#[test]
fn a_rolled_back_transaction_can_be_reused() {
    let (env, db) = string_env();

    let txn = env.transaction();
    txn.database(&db).set("k1", "wrong").unwrap();
    txn.rollback().unwrap();

    txn.database(&db).set("k1", "right").unwrap();
    txn.commit().unwrap();

    assert_eq!(db.get("k1").unwrap(), vec![Value::from("right")]);
}

#[test]
fn writes_after_commit_are_rejected() {
    let (env, db) = string_env();

    let txn = env.transaction();
    txn.database(&db).set("k1", "v1").unwrap();
    txn.commit().unwrap();

    assert!(matches!(txn.database(&db).set("k2", "v2"), Err(Error::Config(_))));
}

#[test]
fn dropping_an_active_transaction_rolls_back() {
    let (env, db) = string_env();

    {
        let txn = env.transaction();
        txn.database(&db).set("k1", "v1").unwrap();
    }

    assert_eq!(db.try_get("k1").unwrap(), None);
}

#[test]
fn a_transaction_spans_keyspaces() {
    let env = Environment::in_memory();
    let users = env
        .add_database(
            "users",
            Schema::new(vec![Field::string()], vec![Field::string()]).expect("schema"),
        )
        .expect("add users");
    let events = env
        .add_database(
            "events",
            Schema::new(vec![Field::u64()], vec![Field::string()]).expect("schema"),
        )
        .expect("add events");
    env.open().expect("open");

    let txn = env.transaction();
    txn.database(&users).set("alice", "active").unwrap();
    txn.database(&events).set(1_u64, "signup").unwrap();
    txn.commit().unwrap();

    assert_eq!(users.get("alice").unwrap(), vec![Value::from("active")]);
    assert_eq!(events.get(1_u64).unwrap(), vec![Value::from("signup")]);
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn overlapping_writers_conflict_and_the_loser_is_doomed() {
    let (env, db) = string_env();

    let txn1 = env.transaction();
    let txn2 = env.transaction();
    txn1.database(&db).set("k1", "t1").unwrap();
    txn2.database(&db).set("k1", "t2").unwrap();

    // The second committer loses while the first still holds the key.
    assert!(matches!(txn2.commit(), Err(Error::Conflict)));

    txn1.commit().unwrap();
    assert_eq!(db.get("k1").unwrap(), vec![Value::from("t1")]);

    // The loser stays doomed until rolled back.
    assert!(matches!(txn2.commit(), Err(Error::Conflict)));
    txn2.rollback().unwrap();

    txn2.database(&db).set("k1", "t2-retry").unwrap();
    txn2.commit().unwrap();
    assert_eq!(db.get("k1").unwrap(), vec![Value::from("t2-retry")]);
}

#[test]
fn disjoint_writers_both_commit() {
    let (env, db) = string_env();

    let txn1 = env.transaction();
    let txn2 = env.transaction();
    txn1.database(&db).set("k1", "t1").unwrap();
    txn2.database(&db).set("k2", "t2").unwrap();

    txn1.commit().unwrap();
    txn2.commit().unwrap();

    assert_eq!(db.get("k1").unwrap(), vec![Value::from("t1")]);
    assert_eq!(db.get("k2").unwrap(), vec![Value::from("t2")]);
}

#[test]
fn a_concurrent_autocommit_dooms_the_transaction() {
    let (env, db) = string_env();

    let txn = env.transaction();
    txn.database(&db).set("k1", "txn").unwrap();

    db.set("k1", "autocommit").unwrap();

    assert!(matches!(txn.commit(), Err(Error::Conflict)));
    assert_eq!(db.get("k1").unwrap(), vec![Value::from("autocommit")]);
}

// ============================================================================
// Scoped transactions
// ============================================================================

#[test]
fn with_transaction_commits_on_ok() {
    let (env, db) = string_env();

    env.with_transaction(|txn| {
        txn.database(&db).set("k1", "v1")?;
        txn.database(&db).set("k2", "v2")?;
        Ok(())
    })
    .unwrap();

    assert_eq!(db.len().unwrap(), 2);
}

#[test]
fn with_transaction_rolls_back_on_err() {
    let (env, db) = string_env();

    let out: terrane::Result<()> = env.with_transaction(|txn| {
        txn.database(&db).set("k1", "v1")?;
        Err(Error::Domain("abort".to_owned()))
    });

    assert!(matches!(out, Err(Error::Domain(_))));
    assert_eq!(db.try_get("k1").unwrap(), None);
}
