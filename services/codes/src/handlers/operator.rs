use codedrop_auth_types::identity::OperatorHeaders;

use crate::domain::types::OperatorId;
use crate::error::CodesServiceError;
use crate::state::AppState;
use crate::usecase::operator::{RegisterOperatorInput, RegisterOperatorUseCase};

/// Reject operators outside the allow-list, then refresh their registry entry.
///
/// Rejected callers never reach the store.
pub async fn authorize(
    state: &AppState,
    identity: OperatorHeaders,
) -> Result<OperatorId, CodesServiceError> {
    if !state.is_admin(identity.operator_id) {
        tracing::warn!(operator_id = identity.operator_id, "operator not authorized");
        return Err(CodesServiceError::Forbidden);
    }
    let usecase = RegisterOperatorUseCase {
        repo: state.user_repo(),
    };
    usecase
        .execute(RegisterOperatorInput {
            id: identity.operator_id,
            display_name: identity.display_name,
            handle: identity.handle,
        })
        .await?;
    Ok(identity.operator_id)
}
