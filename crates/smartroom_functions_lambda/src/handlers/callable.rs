use smartroom_functions_core::contract::{
    CallResult, CallableError, CallableRequest, MIGRATION_STARTED_MESSAGE,
    UNAUTHENTICATED_MIGRATION_MESSAGE,
};

// Identity is checked before anything else. No migration runs here.
pub fn handle_migrate_user_claims(
    request: &CallableRequest,
) -> Result<CallResult, CallableError> {
    let Some(identity) = request.auth.as_ref() else {
        return Err(CallableError::unauthenticated(
            UNAUTHENTICATED_MIGRATION_MESSAGE,
        ));
    };

    tracing::debug!(uid = %identity.uid, "claims migration accepted");
    Ok(CallResult::accepted(MIGRATION_STARTED_MESSAGE))
}
