//! Throwaway SQLite databases for store tests.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

/// A migrated SQLite database in a temporary directory, removed on drop.
///
/// Backed by a real file so a pool of several connections shares one database, which
/// in-memory SQLite cannot do.
pub struct TestDatabase {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

impl TestDatabase {
    /// Create a fresh WAL-journaled database file and apply every migration of `M`.
    ///
    /// Panics on any failure; intended for tests only.
    pub async fn migrated<M: MigratorTrait>() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("codes.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let mut options = ConnectOptions::new(url);
        options.max_connections(8).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("connect to test database");
        db.execute_unprepared("PRAGMA journal_mode=WAL;")
            .await
            .expect("enable WAL journal");
        M::up(&db, None).await.expect("apply migrations");

        Self { db, _dir: dir }
    }
}
