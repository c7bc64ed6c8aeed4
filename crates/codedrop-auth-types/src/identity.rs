//! Bridge-injected operator identity headers extractor.

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, StatusCode};

pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";
pub const OPERATOR_HANDLE_HEADER: &str = "x-operator-handle";

/// Operator identity injected by the chat bridge.
///
/// `x-operator-id` is the chat platform's numeric user id and is required; a missing or
/// non-integer value is rejected with 401. `x-operator-name` and `x-operator-handle` carry
/// the most recently observed display name and handle and may be absent. Header values are
/// read as UTF-8 so non-ASCII display names survive.
///
/// Allow-list enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorHeaders {
    pub operator_id: i64,
    pub display_name: Option<String>,
    pub handle: Option<String>,
}

impl<S> FromRequestParts<S> for OperatorHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously and return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let operator_id = header_text(&parts.headers, OPERATOR_ID_HEADER)
            .and_then(|s| s.trim().parse::<i64>().ok());
        let display_name = header_text(&parts.headers, OPERATOR_NAME_HEADER);
        let handle = header_text(&parts.headers, OPERATOR_HANDLE_HEADER)
            .map(|h| h.trim_start_matches('@').to_owned())
            .filter(|h| !h.is_empty());

        async move {
            let operator_id = operator_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self {
                operator_id,
                display_name,
                handle,
            })
        }
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
