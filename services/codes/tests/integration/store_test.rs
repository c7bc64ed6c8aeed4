use std::collections::HashSet;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use codedrop_codes::domain::repository::{CodeRepository, UserRepository};
use codedrop_codes::domain::types::{
    CodeStatus, InsertOutcome, ResetOutcome, UsageEntry, UsageScope, User,
};
use codedrop_codes::infra::db::{DbCodeRepository, DbUserRepository, connect};
use codedrop_codes::infra::gate::WriteGate;
use codedrop_codes_migration::Migrator;
use codedrop_codes_schema::codes as code_entity;
use codedrop_testing::db::TestDatabase;

use crate::helpers::{ADMIN, OTHER_ADMIN, codes};

async fn setup() -> (TestDatabase, DbCodeRepository, DbUserRepository) {
    let test_db = TestDatabase::migrated::<Migrator>().await;
    let code_repo = DbCodeRepository {
        db: test_db.db.clone(),
        gate: WriteGate::new(),
    };
    let user_repo = DbUserRepository {
        db: test_db.db.clone(),
    };
    (test_db, code_repo, user_repo)
}

fn user(id: i64, display_name: &str, handle: Option<&str>) -> User {
    User {
        id,
        display_name: display_name.to_owned(),
        handle: handle.map(str::to_owned),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn should_run_upload_distribute_report_reset_clear_scenario() {
    let (_db, repo, _) = setup().await;

    let outcome = repo
        .insert_batch(&codes(&["A1", "A2", "A1", "A3"]), 1)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        InsertOutcome {
            inserted: 3,
            duplicates: 1,
        }
    );
    assert_eq!(repo.count_unused().await.unwrap(), 3);

    assert_eq!(repo.allocate_next(2).await.unwrap().as_deref(), Some("A1"));
    assert_eq!(repo.allocate_next(3).await.unwrap().as_deref(), Some("A2"));
    assert_eq!(repo.count_unused().await.unwrap(), 1);

    let report = repo.usage_report(UsageScope::AllTime).await.unwrap();
    let counts: Vec<(i64, u64)> = report.iter().map(|e| (e.user_id, e.count)).collect();
    assert_eq!(counts, [(2, 1), (3, 1)]);
    assert_eq!(repo.total_used(UsageScope::AllTime).await.unwrap(), 2);

    assert_eq!(
        repo.reset_all().await.unwrap(),
        ResetOutcome {
            reset: 2,
            unused: 3,
        }
    );
    assert_eq!(repo.clear_all().await.unwrap(), 3);
    assert_eq!(repo.count_unused().await.unwrap(), 0);
}

#[tokio::test]
async fn should_count_inserted_and_duplicates_across_batches() {
    let (_db, repo, _) = setup().await;

    repo.insert_batch(&codes(&["A1", "A2"]), ADMIN).await.unwrap();
    let outcome = repo
        .insert_batch(&codes(&["A2", "A3", "a3", "A3"]), OTHER_ADMIN)
        .await
        .unwrap();

    // "A2" was stored by the first batch and the second "A3" repeats this one.
    assert_eq!(
        outcome,
        InsertOutcome {
            inserted: 2,
            duplicates: 2,
        }
    );
    assert_eq!(repo.count_unused().await.unwrap(), 4);
    let lowercase = repo.find_by_value("a3").await.unwrap().unwrap();
    assert_eq!(lowercase.uploaded_by, OTHER_ADMIN);
    assert_eq!(lowercase.status, CodeStatus::Unused);
    // The first upload owns a value even when re-uploaded later.
    let existing = repo.find_by_value("A2").await.unwrap().unwrap();
    assert_eq!(existing.uploaded_by, ADMIN);
}

#[tokio::test]
async fn should_treat_fully_duplicate_batch_as_zero_inserted() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["D1", "D2"]), ADMIN).await.unwrap();

    let outcome = repo.insert_batch(&codes(&["D2", "D1"]), ADMIN).await.unwrap();

    assert_eq!(
        outcome,
        InsertOutcome {
            inserted: 0,
            duplicates: 2,
        }
    );
    assert_eq!(repo.count_unused().await.unwrap(), 2);
}

#[tokio::test]
async fn should_insert_batches_larger_than_one_statement() {
    let (_db, repo, _) = setup().await;
    let first: Vec<String> = (0..1200).map(|i| format!("BULK-{i:05}")).collect();
    let second: Vec<String> = (1100..1300).map(|i| format!("BULK-{i:05}")).collect();

    let outcome = repo.insert_batch(&first, ADMIN).await.unwrap();
    assert_eq!(outcome.inserted, 1200);
    assert_eq!(outcome.duplicates, 0);

    let outcome = repo.insert_batch(&second, ADMIN).await.unwrap();
    assert_eq!(outcome.inserted, 100);
    assert_eq!(outcome.duplicates, 100);
    assert_eq!(repo.count_unused().await.unwrap(), 1300);
}

#[tokio::test]
async fn should_allocate_in_fifo_order_across_uploads() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["Z9", "B2"]), ADMIN).await.unwrap();
    repo.insert_batch(&codes(&["A0"]), OTHER_ADMIN).await.unwrap();

    let mut handed_out = Vec::new();
    while let Some(value) = repo.allocate_next(ADMIN).await.unwrap() {
        handed_out.push(value);
    }

    assert_eq!(handed_out, ["Z9", "B2", "A0"]);
}

#[tokio::test]
async fn should_return_none_when_pool_is_empty() {
    let (_db, repo, _) = setup().await;

    assert_eq!(repo.allocate_next(ADMIN).await.unwrap(), None);
    assert_eq!(repo.count_used_by(ADMIN).await.unwrap(), 0);
    assert!(repo.usage_report(UsageScope::AllTime).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_stamp_user_and_time_on_allocation() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["S1"]), ADMIN).await.unwrap();
    let before = Utc::now();

    repo.allocate_next(OTHER_ADMIN).await.unwrap();

    let code = repo.find_by_value("S1").await.unwrap().unwrap();
    assert_eq!(code.status, CodeStatus::Used);
    assert_eq!(code.used_by, Some(OTHER_ADMIN));
    let used_at = code.used_at.unwrap();
    assert!(used_at >= before - Duration::seconds(1));
    assert!(used_at <= Utc::now() + Duration::seconds(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_never_hand_out_the_same_code_twice_concurrently() {
    let (_db, repo, _) = setup().await;
    let values: Vec<String> = (0..50).map(|i| format!("C{i:03}")).collect();
    repo.insert_batch(&values, ADMIN).await.unwrap();

    let mut tasks = Vec::new();
    for operator in 0..60_i64 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            repo.allocate_next(100 + operator).await.unwrap()
        }));
    }
    let mut handed_out = Vec::new();
    for task in tasks {
        if let Some(value) = task.await.unwrap() {
            handed_out.push(value);
        }
    }

    assert_eq!(handed_out.len(), 50, "every code handed out exactly once");
    let distinct: HashSet<&String> = handed_out.iter().collect();
    assert_eq!(distinct.len(), 50, "no code handed out twice");
    assert_eq!(repo.count_unused().await.unwrap(), 0);
    assert_eq!(repo.total_used(UsageScope::AllTime).await.unwrap(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_hand_out_the_oldest_codes_to_concurrent_callers() {
    let (_db, repo, _) = setup().await;
    let values: Vec<String> = (0..80).map(|i| format!("F{i:03}")).collect();
    repo.insert_batch(&values, ADMIN).await.unwrap();

    let mut tasks = Vec::new();
    for operator in 0..30_i64 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            repo.allocate_next(100 + operator).await.unwrap()
        }));
    }
    let mut handed_out = HashSet::new();
    for task in tasks {
        handed_out.insert(task.await.unwrap().unwrap());
    }

    let oldest: HashSet<String> = values[..30].iter().cloned().collect();
    assert_eq!(handed_out, oldest);
    assert_eq!(repo.count_unused().await.unwrap(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_serialize_reset_with_concurrent_allocation() {
    let (_db, repo, _) = setup().await;
    let values: Vec<String> = (0..200).map(|i| format!("G{i:03}")).collect();
    repo.insert_batch(&values, ADMIN).await.unwrap();

    let mut tasks = Vec::new();
    for operator in 0..100_i64 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            repo.allocate_next(100 + operator).await.unwrap()
        }));
    }
    let reset = {
        let repo = repo.clone();
        tokio::spawn(async move { repo.reset_all().await.unwrap() })
    };

    let mut allocated = 0;
    for task in tasks {
        assert!(task.await.unwrap().is_some(), "pool never runs dry");
        allocated += 1;
    }
    let reset = reset.await.unwrap();

    assert_eq!(allocated, 100);
    // Nothing was mid-allocation while the reset ran.
    assert_eq!(reset.unused, 200);
    let used = repo.total_used(UsageScope::AllTime).await.unwrap();
    assert_eq!(used, 100 - reset.reset);
    assert_eq!(used + repo.count_unused().await.unwrap(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_serialize_clear_with_concurrent_allocation() {
    let (_db, repo, _) = setup().await;
    let values: Vec<String> = (0..50).map(|i| format!("H{i:03}")).collect();
    repo.insert_batch(&values, ADMIN).await.unwrap();

    let mut tasks = Vec::new();
    for operator in 0..60_i64 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            repo.allocate_next(100 + operator).await.unwrap()
        }));
    }
    let clear = {
        let repo = repo.clone();
        tokio::spawn(async move { repo.clear_all().await.unwrap() })
    };

    let mut handed_out = Vec::new();
    for task in tasks {
        if let Some(value) = task.await.unwrap() {
            handed_out.push(value);
        }
    }

    // Clear removes used and unused rows alike.
    assert_eq!(clear.await.unwrap(), 50);
    let distinct: HashSet<&String> = handed_out.iter().collect();
    assert_eq!(distinct.len(), handed_out.len(), "no code handed out twice");
    assert!(handed_out.len() <= 50);
    assert_eq!(repo.count_unused().await.unwrap(), 0);
    assert_eq!(repo.total_used(UsageScope::AllTime).await.unwrap(), 0);
    assert!(repo.usage_report(UsageScope::AllTime).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_insert_concurrently_with_allocation() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["SEED"]), ADMIN).await.unwrap();

    let mut uploads = Vec::new();
    for batch in 0..4 {
        let repo = repo.clone();
        // Batches overlap pairwise so some values race on the unique constraint.
        let values: Vec<String> = (batch * 10..batch * 10 + 20)
            .map(|i| format!("P{i:03}"))
            .collect();
        uploads.push(tokio::spawn(async move {
            repo.insert_batch(&values, ADMIN).await.unwrap()
        }));
    }
    let mut allocations = Vec::new();
    for _ in 0..5 {
        let repo = repo.clone();
        allocations.push(tokio::spawn(async move {
            repo.allocate_next(OTHER_ADMIN).await.unwrap()
        }));
    }

    let mut inserted = 0;
    for upload in uploads {
        let outcome = upload.await.unwrap();
        assert_eq!(outcome.inserted + outcome.duplicates, 20);
        inserted += outcome.inserted;
    }
    let mut allocated = 0;
    for allocation in allocations {
        if allocation.await.unwrap().is_some() {
            allocated += 1;
        }
    }

    // P000..P049 are 50 distinct values.
    assert_eq!(inserted, 50);
    assert_eq!(repo.count_unused().await.unwrap(), 51 - allocated);
    assert_eq!(repo.count_used_by(OTHER_ADMIN).await.unwrap(), allocated);
}

#[tokio::test]
async fn should_reset_used_codes_and_clear_stamps() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["R1", "R2", "R3"]), ADMIN).await.unwrap();
    repo.allocate_next(OTHER_ADMIN).await.unwrap();
    repo.allocate_next(OTHER_ADMIN).await.unwrap();

    let outcome = repo.reset_all().await.unwrap();

    assert_eq!(
        outcome,
        ResetOutcome {
            reset: 2,
            unused: 3,
        }
    );
    let code = repo.find_by_value("R1").await.unwrap().unwrap();
    assert_eq!(code.status, CodeStatus::Unused);
    assert_eq!(code.used_by, None);
    assert_eq!(code.used_at, None);
    assert_eq!(repo.count_used_by(OTHER_ADMIN).await.unwrap(), 0);
    // Reset codes go back into the queue at their first position.
    assert_eq!(repo.allocate_next(ADMIN).await.unwrap().as_deref(), Some("R1"));
}

#[tokio::test]
async fn should_reset_nothing_when_no_code_is_used() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["N1"]), ADMIN).await.unwrap();

    assert_eq!(
        repo.reset_all().await.unwrap(),
        ResetOutcome {
            reset: 0,
            unused: 1,
        }
    );
}

#[tokio::test]
async fn should_clear_every_code_and_never_reuse_ids() {
    let (_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["K1", "K2"]), ADMIN).await.unwrap();
    repo.allocate_next(ADMIN).await.unwrap();
    let last_id = repo.find_by_value("K2").await.unwrap().unwrap().id;

    assert_eq!(repo.clear_all().await.unwrap(), 2);
    assert_eq!(repo.clear_all().await.unwrap(), 0);

    // A cleared value may be uploaded again.
    let outcome = repo.insert_batch(&codes(&["K1"]), ADMIN).await.unwrap();
    assert_eq!(outcome.inserted, 1);
    let reinserted = repo.find_by_value("K1").await.unwrap().unwrap();
    assert!(reinserted.id > last_id, "ids must keep increasing after a clear");
}

#[tokio::test]
async fn should_scope_usage_to_current_utc_day() {
    let (test_db, repo, _) = setup().await;
    repo.insert_batch(&codes(&["T1", "T2", "T3"]), ADMIN).await.unwrap();
    repo.allocate_next(ADMIN).await.unwrap();
    repo.allocate_next(ADMIN).await.unwrap();
    repo.allocate_next(OTHER_ADMIN).await.unwrap();

    code_entity::Entity::update_many()
        .col_expr(
            code_entity::Column::UsedAt,
            Expr::value(Utc::now() - Duration::days(2)),
        )
        .filter(code_entity::Column::Value.is_in(["T1", "T3"]))
        .exec(&test_db.db)
        .await
        .unwrap();

    let today = repo.usage_report(UsageScope::Today).await.unwrap();
    let counts: Vec<(i64, u64)> = today.iter().map(|e| (e.user_id, e.count)).collect();
    assert_eq!(counts, [(ADMIN, 1)]);
    assert_eq!(repo.total_used(UsageScope::Today).await.unwrap(), 1);

    let all_time = repo.usage_report(UsageScope::AllTime).await.unwrap();
    let counts: Vec<(i64, u64)> = all_time.iter().map(|e| (e.user_id, e.count)).collect();
    assert_eq!(counts, [(ADMIN, 2), (OTHER_ADMIN, 1)]);
    assert_eq!(repo.total_used(UsageScope::AllTime).await.unwrap(), 3);
}

#[tokio::test]
async fn should_join_usage_with_user_registry() {
    let (_db, repo, users) = setup().await;
    users
        .upsert(&user(OTHER_ADMIN, "Alice", Some("alice")))
        .await
        .unwrap();
    repo.insert_batch(&codes(&["J1", "J2"]), ADMIN).await.unwrap();
    repo.allocate_next(ADMIN).await.unwrap();
    repo.allocate_next(OTHER_ADMIN).await.unwrap();

    let report = repo.usage_report(UsageScope::AllTime).await.unwrap();

    assert_eq!(
        report,
        [
            UsageEntry {
                user_id: ADMIN,
                display_name: None,
                handle: None,
                count: 1,
            },
            UsageEntry {
                user_id: OTHER_ADMIN,
                display_name: Some("Alice".to_owned()),
                handle: Some("alice".to_owned()),
                count: 1,
            },
        ]
    );
    assert_eq!(report[0].label(), ADMIN.to_string());
    assert_eq!(report[1].label(), "Alice");
}

#[tokio::test]
async fn should_overwrite_user_on_upsert() {
    let (_db, _, users) = setup().await;
    users.upsert(&user(ADMIN, "Old", Some("old"))).await.unwrap();

    let latest = user(ADMIN, "New", None);
    users.upsert(&latest).await.unwrap();

    let stored = users.find_by_id(ADMIN).await.unwrap().unwrap();
    assert_eq!(stored.display_name, "New");
    assert_eq!(stored.handle, None);
    assert!(users.find_by_id(OTHER_ADMIN).await.unwrap().is_none());
}

#[tokio::test]
async fn should_open_database_file_and_apply_migrations_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("codes.db").display());

    let db = connect(&url).await.unwrap();
    let repo = DbCodeRepository {
        db: db.clone(),
        gate: WriteGate::new(),
    };
    repo.insert_batch(&codes(&["W1"]), ADMIN).await.unwrap();
    drop(repo);
    db.close().await.unwrap();

    // Reopening keeps existing data and skips applied migrations.
    let db = connect(&url).await.unwrap();
    let repo = DbCodeRepository {
        db,
        gate: WriteGate::new(),
    };
    assert_eq!(repo.count_unused().await.unwrap(), 1);
}
