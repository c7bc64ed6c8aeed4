use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use codedrop_core::health::Readiness;

use crate::domain::types::OperatorId;
use crate::infra::db::{DbCodeRepository, DbUserRepository};
use crate::infra::gate::WriteGate;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Shared by every code repository handed out, so allocation, reset and clear
    /// serialize process-wide.
    pub gate: WriteGate,
    pub admin_ids: Arc<HashSet<OperatorId>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, admin_ids: HashSet<OperatorId>) -> Self {
        Self {
            db,
            gate: WriteGate::new(),
            admin_ids: Arc::new(admin_ids),
        }
    }

    pub fn is_admin(&self, operator_id: OperatorId) -> bool {
        self.admin_ids.contains(&operator_id)
    }

    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
            gate: self.gate.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }
}

impl Readiness for AppState {
    async fn is_ready(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}
