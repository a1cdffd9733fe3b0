//! SDK error classification.

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use tgw_core::ControlPlaneError;

/// Classify an SDK failure by its service error code.
pub fn classify<E, R>(err: SdkError<E, R>) -> ControlPlaneError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
    classify_code(code.as_deref(), DisplayErrorContext(&err).to_string())
}

/// Map an EC2-style error code onto a [`ControlPlaneError`].
///
/// `*.NotFound` codes mean the resource is gone, `IncorrectState` means a
/// previous request is still being applied, and duplicate/already-bound
/// codes mean the requested binding exists.
pub fn classify_code(code: Option<&str>, message: String) -> ControlPlaneError {
    match code {
        Some(c) if c.ends_with(".NotFound") || c == "ResourceNotFoundException" => {
            ControlPlaneError::NotFound(message)
        }
        Some(c) if c.starts_with("IncorrectState") => ControlPlaneError::IncorrectState(message),
        Some(c)
            if c.ends_with(".Duplicate")
                || c == "Resource.AlreadyAssociated"
                || c == "RouteAlreadyExists" =>
        {
            ControlPlaneError::AlreadyExists(message)
        }
        _ => ControlPlaneError::Service(message),
    }
}
