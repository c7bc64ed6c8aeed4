use axum::{
    Json,
    extract::{RawQuery, State},
};
use serde::{Deserialize, Serialize};

use codedrop_auth_types::identity::OperatorHeaders;

use crate::domain::types::{OperatorId, UsageEntry, UsageScope};
use crate::error::CodesServiceError;
use crate::handlers::operator::authorize;
use crate::state::AppState;
use crate::usecase::usage::{GetOperatorUsageUseCase, GetUsageReportUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UsageEntryResponse {
    pub user_id: OperatorId,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub label: String,
    pub count: u64,
}

impl From<UsageEntry> for UsageEntryResponse {
    fn from(entry: UsageEntry) -> Self {
        let label = entry.label();
        Self {
            user_id: entry.user_id,
            name: entry.display_name,
            handle: entry.handle,
            label,
            count: entry.count,
        }
    }
}

#[derive(Serialize)]
pub struct UsageResponse {
    pub scope: &'static str,
    pub total: u64,
    pub users: Vec<UsageEntryResponse>,
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UsageQuery {
    pub scope: Option<String>,
}

// ── GET /codes/usage ─────────────────────────────────────────────────────────

pub async fn get_usage(
    identity: OperatorHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<UsageResponse>, CodesServiceError> {
    authorize(&state, identity).await?;
    let query: UsageQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| CodesServiceError::MissingData)?
        .unwrap_or_default();
    let scope = match query.scope.as_deref() {
        None => UsageScope::default(),
        Some(s) => UsageScope::from_kebab(s).ok_or(CodesServiceError::MissingData)?,
    };

    let usecase = GetUsageReportUseCase {
        repo: state.code_repo(),
    };
    let report = usecase.execute(scope).await?;
    Ok(Json(UsageResponse {
        scope: report.scope.as_kebab(),
        total: report.total,
        users: report.entries.into_iter().map(Into::into).collect(),
    }))
}

// ── GET /codes/usage/@me ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OperatorUsageResponse {
    pub user_id: OperatorId,
    pub count: u64,
}

pub async fn get_my_usage(
    identity: OperatorHeaders,
    State(state): State<AppState>,
) -> Result<Json<OperatorUsageResponse>, CodesServiceError> {
    let operator_id = authorize(&state, identity).await?;
    let usecase = GetOperatorUsageUseCase {
        repo: state.code_repo(),
    };
    let count = usecase.execute(operator_id).await?;
    Ok(Json(OperatorUsageResponse {
        user_id: operator_id,
        count,
    }))
}
