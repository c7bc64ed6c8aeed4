use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
    http::{
        HeaderMap, HeaderName, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
};
use serde::{Deserialize, Serialize};

use codedrop_auth_types::identity::OperatorHeaders;

use crate::domain::parse::{decode_upload, disposition_filename, is_text_upload};
use crate::error::CodesServiceError;
use crate::handlers::operator::authorize;
use crate::state::AppState;
use crate::usecase::code::{
    ClearCodesInput, ClearCodesUseCase, DistributeCodeUseCase, GetRemainingUseCase,
    ResetCodesUseCase, UploadCodesInput, UploadCodesUseCase,
};

// ── POST /codes ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadResponse {
    pub inserted: u64,
    pub duplicates: u64,
    pub unused: u64,
}

/// Body is plain text or a text file: one code per line and/or comma-separated.
/// A `Content-Disposition` filename ending in `.txt` is accepted whatever the content type.
pub async fn upload_codes(
    identity: OperatorHeaders,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), CodesServiceError> {
    let operator_id = authorize(&state, identity).await?;

    let content_type = header_str(&headers, CONTENT_TYPE)?;
    let filename = header_str(&headers, CONTENT_DISPOSITION)?.and_then(disposition_filename);
    if !is_text_upload(content_type, filename) {
        return Err(CodesServiceError::UnsupportedUpload);
    }

    let usecase = UploadCodesUseCase {
        repo: state.code_repo(),
    };
    let output = usecase
        .execute(
            operator_id,
            UploadCodesInput {
                text: decode_upload(&body),
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            inserted: output.inserted,
            duplicates: output.duplicates,
            unused: output.unused,
        }),
    ))
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Result<Option<&str>, CodesServiceError> {
    headers
        .get(name)
        .map(|value| value.to_str().map_err(|_| CodesServiceError::UnsupportedUpload))
        .transpose()
}

// ── POST /codes/distribute ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DistributeResponse {
    /// `null` when no unused codes remain.
    pub code: Option<String>,
}

pub async fn distribute_code(
    identity: OperatorHeaders,
    State(state): State<AppState>,
) -> Result<Json<DistributeResponse>, CodesServiceError> {
    let operator_id = authorize(&state, identity).await?;
    let usecase = DistributeCodeUseCase {
        repo: state.code_repo(),
    };
    let code = usecase.execute(operator_id).await?;
    Ok(Json(DistributeResponse { code }))
}

// ── GET /codes/remaining ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RemainingResponse {
    pub unused: u64,
}

pub async fn get_remaining(
    identity: OperatorHeaders,
    State(state): State<AppState>,
) -> Result<Json<RemainingResponse>, CodesServiceError> {
    authorize(&state, identity).await?;
    let usecase = GetRemainingUseCase {
        repo: state.code_repo(),
    };
    let unused = usecase.execute().await?;
    Ok(Json(RemainingResponse { unused }))
}

// ── POST /codes/reset ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ResetResponse {
    pub reset: u64,
    pub unused: u64,
}

pub async fn reset_codes(
    identity: OperatorHeaders,
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, CodesServiceError> {
    let operator_id = authorize(&state, identity).await?;
    let usecase = ResetCodesUseCase {
        repo: state.code_repo(),
    };
    let outcome = usecase.execute(operator_id).await?;
    Ok(Json(ResetResponse {
        reset: outcome.reset,
        unused: outcome.unused,
    }))
}

// ── DELETE /codes ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ClearQuery {
    pub confirm: Option<bool>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

pub async fn clear_codes(
    identity: OperatorHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<ClearResponse>, CodesServiceError> {
    let operator_id = authorize(&state, identity).await?;
    let query: ClearQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| CodesServiceError::MissingData)?
        .unwrap_or_default();

    let usecase = ClearCodesUseCase {
        repo: state.code_repo(),
    };
    let removed = usecase
        .execute(
            operator_id,
            ClearCodesInput {
                confirmed: query.confirm.unwrap_or(false),
            },
        )
        .await?;
    Ok(Json(ClearResponse { removed }))
}
