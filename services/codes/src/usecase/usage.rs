use crate::domain::repository::CodeRepository;
use crate::domain::types::{OperatorId, UsageEntry, UsageScope};
use crate::error::CodesServiceError;

// ── GetUsageReport ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UsageReport {
    pub scope: UsageScope,
    pub total: u64,
    pub entries: Vec<UsageEntry>,
}

pub struct GetUsageReportUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> GetUsageReportUseCase<R> {
    pub async fn execute(&self, scope: UsageScope) -> Result<UsageReport, CodesServiceError> {
        let entries = self.repo.usage_report(scope).await?;
        let total = self.repo.total_used(scope).await?;
        Ok(UsageReport {
            scope,
            total,
            entries,
        })
    }
}

// ── GetOperatorUsage ─────────────────────────────────────────────────────────

pub struct GetOperatorUsageUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> GetOperatorUsageUseCase<R> {
    pub async fn execute(&self, operator_id: OperatorId) -> Result<u64, CodesServiceError> {
        self.repo.count_used_by(operator_id).await
    }
}
