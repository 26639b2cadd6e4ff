//! ISPConfig fault mapping
//!
//! The remoting layer reports every failure as `code == "remote_fault"`
//! with a free-text message (often a form-validator token such as
//! `domain_error_unique<br />`). Mapping therefore goes by message pattern,
//! not by code.

use crate::error::ClientError;

/// Extra information for mapping a fault to a structured error.
#[derive(Debug, Clone, Default)]
pub(crate) struct FaultContext {
    /// Name of the resource the call was about (for `ResourceExists` /
    /// `ResourceNotFound`).
    pub resource: Option<String>,
}

impl FaultContext {
    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            resource: Some(name.into()),
        }
    }
}

/// Map a remote fault to the unified error type.
pub(crate) fn map_remote_fault(
    method: &str,
    code: &str,
    message: Option<String>,
    context: FaultContext,
) -> ClientError {
    let raw = message.filter(|m| !m.is_empty());
    let normalized = raw.as_deref().unwrap_or_default().to_ascii_lowercase();
    let resource = || {
        context
            .resource
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    };

    if normalized.contains("login failed") || normalized.contains("user can not be found") {
        return ClientError::InvalidCredentials { raw_message: raw };
    }

    if normalized.contains("session is expired") || normalized.contains("session does not exist") {
        return ClientError::SessionExpired {
            method: method.to_string(),
            raw_message: raw,
        };
    }

    if normalized.contains("permission") {
        return ClientError::PermissionDenied {
            method: method.to_string(),
            raw_message: raw,
        };
    }

    // Validator tokens: domain_error_unique, database_name_error_unique,
    // database_user_error_unique ... plus free-text duplicates.
    if normalized.contains("error_unique")
        || normalized.contains("already exist")
        || normalized.contains("is already in use")
    {
        return ClientError::ResourceExists {
            method: method.to_string(),
            resource: resource(),
            raw_message: raw,
        };
    }

    if normalized.contains("not found") || normalized.contains("no record") {
        return ClientError::ResourceNotFound {
            method: method.to_string(),
            resource: resource(),
            raw_message: raw,
        };
    }

    if normalized.contains("error_empty") || normalized.contains("error_regex") {
        return ClientError::InvalidParameter {
            method: method.to_string(),
            param: "params".to_string(),
            detail: raw.unwrap_or_default(),
        };
    }

    ClientError::RemoteFault {
        method: method.to_string(),
        raw_code: Some(code.to_string()),
        raw_message: raw.unwrap_or_else(|| "unspecified remote fault".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FaultContext {
        FaultContext::default()
    }

    #[test]
    fn login_failed_maps_to_invalid_credentials() {
        let err = map_remote_fault(
            "login",
            "remote_fault",
            Some("The login failed. Username or password wrong.".to_string()),
            ctx(),
        );
        assert!(matches!(err, ClientError::InvalidCredentials { .. }));
    }

    #[test]
    fn expired_session_maps_to_session_expired() {
        let err = map_remote_fault(
            "sites_web_domain_add",
            "remote_fault",
            Some("The Session is expired or does not exist.".to_string()),
            ctx(),
        );
        assert!(matches!(err, ClientError::SessionExpired { .. }));
    }

    #[test]
    fn permission_message_maps_to_permission_denied() {
        let err = map_remote_fault(
            "sites_database_add",
            "remote_fault",
            Some("You do not have the permissions to access this function.".to_string()),
            ctx(),
        );
        assert!(matches!(err, ClientError::PermissionDenied { .. }));
    }

    #[test]
    fn unique_validator_token_maps_to_resource_exists() {
        let err = map_remote_fault(
            "sites_web_domain_add",
            "remote_fault",
            Some("domain_error_unique<br />".to_string()),
            FaultContext::resource("example.com"),
        );
        assert!(matches!(
            err,
            ClientError::ResourceExists { resource, .. } if resource == "example.com"
        ));
    }

    #[test]
    fn already_exists_text_maps_to_resource_exists() {
        let err = map_remote_fault(
            "sites_database_user_add",
            "remote_fault",
            Some("Database user already exists on server".to_string()),
            FaultContext::resource("c1user"),
        );
        assert!(matches!(err, ClientError::ResourceExists { .. }));
    }

    #[test]
    fn exists_without_context_uses_placeholder() {
        let err = map_remote_fault(
            "sites_web_domain_add",
            "remote_fault",
            Some("domain_error_unique".to_string()),
            ctx(),
        );
        assert!(matches!(
            err,
            ClientError::ResourceExists { resource, .. } if resource == "<unknown>"
        ));
    }

    #[test]
    fn empty_validator_token_maps_to_invalid_parameter() {
        let err = map_remote_fault(
            "sites_database_add",
            "remote_fault",
            Some("database_name_error_empty".to_string()),
            ctx(),
        );
        assert!(matches!(err, ClientError::InvalidParameter { .. }));
    }

    #[test]
    fn unknown_fault_keeps_raw_message() {
        let err = map_remote_fault(
            "sites_database_add",
            "remote_fault",
            Some("something unexpected".to_string()),
            ctx(),
        );
        assert!(matches!(
            err,
            ClientError::RemoteFault { raw_code, raw_message, .. }
                if raw_code.as_deref() == Some("remote_fault") && raw_message == "something unexpected"
        ));
    }

    #[test]
    fn missing_message_still_produces_fault() {
        let err = map_remote_fault("logout", "remote_fault", None, ctx());
        assert!(matches!(
            err,
            ClientError::RemoteFault { raw_message, .. } if raw_message == "unspecified remote fault"
        ));
    }
}
