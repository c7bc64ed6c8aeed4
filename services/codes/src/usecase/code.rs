use tracing::info;

use crate::domain::parse::extract_codes;
use crate::domain::repository::CodeRepository;
use crate::domain::types::{OperatorId, ResetOutcome};
use crate::error::CodesServiceError;

// ── UploadCodes ──────────────────────────────────────────────────────────────

pub struct UploadCodesInput {
    /// Free text or decoded file contents.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadCodesOutput {
    pub inserted: u64,
    pub duplicates: u64,
    pub unused: u64,
}

pub struct UploadCodesUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> UploadCodesUseCase<R> {
    pub async fn execute(
        &self,
        uploaded_by: OperatorId,
        input: UploadCodesInput,
    ) -> Result<UploadCodesOutput, CodesServiceError> {
        let codes = extract_codes(&input.text);
        if codes.is_empty() {
            return Err(CodesServiceError::NoCodesFound);
        }

        let outcome = self.repo.insert_batch(&codes, uploaded_by).await?;
        let unused = self.repo.count_unused().await?;
        info!(
            operator_id = uploaded_by,
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            unused,
            "codes uploaded"
        );
        Ok(UploadCodesOutput {
            inserted: outcome.inserted,
            duplicates: outcome.duplicates,
            unused,
        })
    }
}

// ── DistributeCode ───────────────────────────────────────────────────────────

pub struct DistributeCodeUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> DistributeCodeUseCase<R> {
    /// Hand out the oldest unused code, or `None` when the pool is empty.
    pub async fn execute(&self, used_by: OperatorId) -> Result<Option<String>, CodesServiceError> {
        let code = self.repo.allocate_next(used_by).await?;
        match &code {
            Some(_) => info!(operator_id = used_by, "code distributed"),
            None => info!(operator_id = used_by, "no unused codes remaining"),
        }
        Ok(code)
    }
}

// ── GetRemaining ─────────────────────────────────────────────────────────────

pub struct GetRemainingUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> GetRemainingUseCase<R> {
    pub async fn execute(&self) -> Result<u64, CodesServiceError> {
        self.repo.count_unused().await
    }
}

// ── ResetCodes ───────────────────────────────────────────────────────────────

pub struct ResetCodesUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> ResetCodesUseCase<R> {
    pub async fn execute(&self, requested_by: OperatorId) -> Result<ResetOutcome, CodesServiceError> {
        let outcome = self.repo.reset_all().await?;
        info!(
            operator_id = requested_by,
            reset = outcome.reset,
            unused = outcome.unused,
            "used codes reset"
        );
        Ok(outcome)
    }
}

// ── ClearCodes ───────────────────────────────────────────────────────────────

pub struct ClearCodesInput {
    /// Explicit acknowledgement that every code, used or not, will be deleted.
    pub confirmed: bool,
}

pub struct ClearCodesUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> ClearCodesUseCase<R> {
    pub async fn execute(
        &self,
        requested_by: OperatorId,
        input: ClearCodesInput,
    ) -> Result<u64, CodesServiceError> {
        if !input.confirmed {
            return Err(CodesServiceError::ConfirmationRequired);
        }
        let removed = self.repo.clear_all().await?;
        tracing::warn!(operator_id = requested_by, removed, "all codes cleared");
        Ok(removed)
    }
}
