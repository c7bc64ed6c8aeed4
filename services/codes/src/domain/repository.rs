#![allow(async_fn_in_trait)]

use crate::domain::types::{
    Code, InsertOutcome, OperatorId, ResetOutcome, UsageEntry, UsageScope, User,
};
use crate::error::CodesServiceError;

/// The code pool.
///
/// `allocate_next`, `reset_all` and `clear_all` are serialized against each other;
/// `insert_batch` relies on the unique constraint on `value` instead.
pub trait CodeRepository: Send + Sync {
    /// Insert candidates not already present, in order. Repeats within `codes` are dropped
    /// first (first occurrence wins). All-or-nothing.
    ///
    /// `inserted + duplicates == codes.len()`: a value repeated inside the batch counts as a
    /// duplicate just like a value that was already stored.
    async fn insert_batch(
        &self,
        codes: &[String],
        uploaded_by: OperatorId,
    ) -> Result<InsertOutcome, CodesServiceError>;

    async fn count_unused(&self) -> Result<u64, CodesServiceError>;

    /// Mark the oldest unused code as used by `used_by` and return its value.
    /// `None` when the pool is exhausted.
    async fn allocate_next(&self, used_by: OperatorId)
    -> Result<Option<String>, CodesServiceError>;

    /// Number of codes distributed by a single operator, all-time.
    async fn count_used_by(&self, user_id: OperatorId) -> Result<u64, CodesServiceError>;

    /// Used codes grouped by operator, count descending then operator id ascending.
    async fn usage_report(&self, scope: UsageScope)
    -> Result<Vec<UsageEntry>, CodesServiceError>;

    async fn total_used(&self, scope: UsageScope) -> Result<u64, CodesServiceError>;

    /// Revert every used code to unused, clearing `used_by`/`used_at`.
    async fn reset_all(&self) -> Result<ResetOutcome, CodesServiceError>;

    /// Delete every code. Returns the number of rows removed.
    async fn clear_all(&self) -> Result<u64, CodesServiceError>;

    /// Look up a single code by value. Not used by any request path; kept for inspecting
    /// stored state in tests and maintenance tooling.
    async fn find_by_value(&self, value: &str) -> Result<Option<Code>, CodesServiceError>;
}

/// Registry of operator display names.
pub trait UserRepository: Send + Sync {
    /// Create or overwrite the entry for `user.id`.
    async fn upsert(&self, user: &User) -> Result<(), CodesServiceError>;

    /// Not used by any request path (reports join the registry in SQL); kept for inspecting
    /// stored state in tests and maintenance tooling.
    async fn find_by_id(&self, id: OperatorId) -> Result<Option<User>, CodesServiceError>;
}
