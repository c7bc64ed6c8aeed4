use chrono::Utc;

use crate::domain::repository::UserRepository;
use crate::domain::types::{OperatorId, User};
use crate::error::CodesServiceError;

// ── RegisterOperator ─────────────────────────────────────────────────────────

pub struct RegisterOperatorInput {
    pub id: OperatorId,
    pub display_name: Option<String>,
    pub handle: Option<String>,
}

/// Record the latest name and handle seen for an operator (last write wins).
pub struct RegisterOperatorUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> RegisterOperatorUseCase<U> {
    pub async fn execute(&self, input: RegisterOperatorInput) -> Result<(), CodesServiceError> {
        let user = User {
            id: input.id,
            display_name: input.display_name.unwrap_or_default(),
            handle: input.handle,
            updated_at: Utc::now(),
        };
        self.repo.upsert(&user).await
    }
}
