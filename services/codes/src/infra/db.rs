use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    Select, Statement, TransactionTrait, Value,
    sea_query::{Expr, OnConflict},
};
use sea_orm_migration::MigratorTrait;

use codedrop_codes_migration::Migrator;
use codedrop_codes_schema::{codes, users};

use crate::domain::repository::{CodeRepository, UserRepository};
use crate::domain::types::{
    Code, CodeStatus, INSERT_CHUNK_SIZE, InsertOutcome, OperatorId, ResetOutcome, UsageEntry,
    UsageScope, User, dedup_preserving_order,
};
use crate::error::CodesServiceError;
use crate::infra::gate::WriteGate;

/// Open the SQLite database at `database_url`, switch it to WAL and apply pending migrations.
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("connect to database")?;
    db.execute_unprepared("PRAGMA journal_mode=WAL;")
        .await
        .context("enable WAL journal")?;
    Migrator::up(&db, None)
        .await
        .context("apply migrations")?;
    Ok(db)
}

// ── Code repository ───────────────────────────────────────────────────────────

// Select and stamp in one statement: the transaction's first statement is a write, so
// SQLite takes the write lock up front instead of upgrading a read snapshot.
const CLAIM_OLDEST_UNUSED_SQL: &str = r#"
    UPDATE codes
    SET is_used = 1, used_by = ?, used_at = ?
    WHERE id = (SELECT id FROM codes WHERE is_used = 0 ORDER BY id ASC LIMIT 1)
      AND is_used = 0
    RETURNING value
"#;

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
    pub gate: WriteGate,
}

impl CodeRepository for DbCodeRepository {
    async fn insert_batch(
        &self,
        codes: &[String],
        uploaded_by: OperatorId,
    ) -> Result<InsertOutcome, CodesServiceError> {
        let unique = dedup_preserving_order(codes);
        if unique.is_empty() {
            return Ok(InsertOutcome::default());
        }
        // Every submitted value that did not become a new row is a duplicate, whether it
        // repeated earlier in this batch or was already stored.
        let submitted = codes.len() as u64;
        let now = Utc::now();

        let inserted = self
            .db
            .transaction::<_, u64, DbErr>(|txn| {
                Box::pin(async move {
                    let mut inserted = 0;
                    for chunk in unique.chunks(INSERT_CHUNK_SIZE) {
                        inserted += insert_chunk(txn, chunk, uploaded_by, now).await?;
                    }
                    Ok(inserted)
                })
            })
            .await
            .context("insert code batch")?;

        Ok(InsertOutcome {
            inserted,
            duplicates: submitted.saturating_sub(inserted),
        })
    }

    async fn count_unused(&self) -> Result<u64, CodesServiceError> {
        let count = unused_codes()
            .count(&self.db)
            .await
            .context("count unused codes")?;
        Ok(count)
    }

    async fn allocate_next(
        &self,
        used_by: OperatorId,
    ) -> Result<Option<String>, CodesServiceError> {
        let db = &self.db;
        let claimed = self
            .gate
            .run(async {
                db.transaction::<_, Option<String>, DbErr>(|txn| {
                    Box::pin(async move { claim_oldest_unused(txn, used_by, Utc::now()).await })
                })
                .await
            })
            .await
            .context("allocate next code")?;
        Ok(claimed)
    }

    async fn count_used_by(&self, user_id: OperatorId) -> Result<u64, CodesServiceError> {
        let count = codes::Entity::find()
            .filter(codes::Column::IsUsed.eq(true))
            .filter(codes::Column::UsedBy.eq(user_id))
            .count(&self.db)
            .await
            .context("count codes used by operator")?;
        Ok(count)
    }

    async fn usage_report(
        &self,
        scope: UsageScope,
    ) -> Result<Vec<UsageEntry>, CodesServiceError> {
        let window = scope.window(Utc::now());
        let window_clause = match window {
            Some(_) => "AND c.used_at >= ? AND c.used_at < ?",
            None => "",
        };
        let values: Vec<Value> = window
            .map(|(start, end)| vec![start.into(), end.into()])
            .unwrap_or_default();

        let sql = format!(
            r#"
            SELECT c.used_by AS user_id, u.display_name AS display_name, u.handle AS handle,
                   COUNT(*) AS count
            FROM codes AS c
            LEFT JOIN users AS u ON u.id = c.used_by
            WHERE c.is_used = 1 AND c.used_by IS NOT NULL {window_clause}
            GROUP BY c.used_by, u.display_name, u.handle
            ORDER BY count DESC, c.used_by ASC
            "#,
        );

        #[derive(Debug, FromQueryResult)]
        struct UsageRow {
            user_id: i64,
            display_name: Option<String>,
            handle: Option<String>,
            count: i64,
        }

        let rows = UsageRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(&self.db)
        .await
        .context("aggregate usage report")?;

        Ok(rows
            .into_iter()
            .map(|row| UsageEntry {
                user_id: row.user_id,
                display_name: row.display_name,
                handle: row.handle,
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    async fn total_used(&self, scope: UsageScope) -> Result<u64, CodesServiceError> {
        let mut query = codes::Entity::find().filter(codes::Column::IsUsed.eq(true));
        if let Some((start, end)) = scope.window(Utc::now()) {
            query = query
                .filter(codes::Column::UsedAt.gte(start))
                .filter(codes::Column::UsedAt.lt(end));
        }
        let count = query
            .count(&self.db)
            .await
            .context("count used codes")?;
        Ok(count)
    }

    async fn reset_all(&self) -> Result<ResetOutcome, CodesServiceError> {
        let db = &self.db;
        let outcome = self
            .gate
            .run(async {
                db.transaction::<_, ResetOutcome, DbErr>(|txn| {
                    Box::pin(async move {
                        let reset = codes::Entity::update_many()
                            .col_expr(codes::Column::IsUsed, Expr::value(false))
                            .col_expr(codes::Column::UsedBy, Expr::value(Option::<i64>::None))
                            .col_expr(
                                codes::Column::UsedAt,
                                Expr::value(Option::<DateTime<Utc>>::None),
                            )
                            .filter(codes::Column::IsUsed.eq(true))
                            .exec(txn)
                            .await?
                            .rows_affected;
                        let unused = unused_codes().count(txn).await?;
                        Ok(ResetOutcome { reset, unused })
                    })
                })
                .await
            })
            .await
            .context("reset used codes")?;
        Ok(outcome)
    }

    async fn clear_all(&self) -> Result<u64, CodesServiceError> {
        let db = &self.db;
        let removed = self
            .gate
            .run(async {
                db.transaction::<_, u64, DbErr>(|txn| {
                    Box::pin(async move {
                        let result = codes::Entity::delete_many().exec(txn).await?;
                        Ok(result.rows_affected)
                    })
                })
                .await
            })
            .await
            .context("clear all codes")?;
        Ok(removed)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Code>, CodesServiceError> {
        let model = codes::Entity::find()
            .filter(codes::Column::Value.eq(value))
            .one(&self.db)
            .await
            .context("find code by value")?;
        Ok(model.map(code_from_model))
    }
}

fn unused_codes() -> Select<codes::Entity> {
    codes::Entity::find().filter(codes::Column::IsUsed.eq(false))
}

async fn insert_chunk<C: ConnectionTrait>(
    conn: &C,
    chunk: &[String],
    uploaded_by: OperatorId,
    now: DateTime<Utc>,
) -> Result<u64, DbErr> {
    let models = chunk.iter().map(|value| codes::ActiveModel {
        value: Set(value.clone()),
        is_used: Set(false),
        uploaded_by: Set(uploaded_by),
        uploaded_at: Set(now),
        ..Default::default()
    });
    // Values already in the table are skipped; rows_affected counts only new rows.
    codes::Entity::insert_many(models)
        .on_conflict(
            OnConflict::column(codes::Column::Value)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

async fn claim_oldest_unused<C: ConnectionTrait>(
    conn: &C,
    used_by: OperatorId,
    now: DateTime<Utc>,
) -> Result<Option<String>, DbErr> {
    #[derive(Debug, FromQueryResult)]
    struct ClaimedRow {
        value: String,
    }

    let row = ClaimedRow::find_by_statement(Statement::from_sql_and_values(
        conn.get_database_backend(),
        CLAIM_OLDEST_UNUSED_SQL,
        [used_by.into(), now.into()],
    ))
    .one(conn)
    .await?;
    Ok(row.map(|row| row.value))
}

fn code_from_model(model: codes::Model) -> Code {
    Code {
        id: model.id,
        value: model.value,
        status: CodeStatus::from_is_used(model.is_used),
        uploaded_by: model.uploaded_by,
        uploaded_at: model.uploaded_at,
        used_by: model.used_by,
        used_at: model.used_at,
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), CodesServiceError> {
        let model = users::ActiveModel {
            id: Set(user.id),
            display_name: Set(user.display_name.clone()),
            handle: Set(user.handle.clone()),
            updated_at: Set(user.updated_at),
        };
        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([
                        users::Column::DisplayName,
                        users::Column::Handle,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert user")?;
        Ok(())
    }

    async fn find_by_id(&self, id: OperatorId) -> Result<Option<User>, CodesServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        display_name: model.display_name,
        handle: model.handle,
        updated_at: model.updated_at,
    }
}
