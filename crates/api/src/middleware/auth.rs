//! # Authentication Module
//!
//! Identity tokens are the unpadded base64 encoding of `"<id>|<role>"`.
//! Handlers resolve them into an [`Identity`] before calling the scheduling
//! engine, which only ever sees the resolved subject id and [`Role`].

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use clinic_core::{errors::ClinicError, models::account::Role};

use super::error_handling::AppError;

/// Subject resolved from an identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: i64,
    pub role: Role,
}

/// Issues a token for a freshly created account.
pub fn issue_token(subject_id: i64, role: Role) -> String {
    STANDARD_NO_PAD.encode(format!("{}|{}", subject_id, role))
}

/// Resolves a token into an [`Identity`].
///
/// # Errors
///
/// `AppError::Unauthenticated` when the token is not valid base64, does not
/// split into exactly two fields or carries a non-numeric id. A well-formed
/// token naming an unknown role is a `ClinicError::Validation`.
pub fn resolve_token(token: &str) -> Result<Identity, AppError> {
    let decoded = STANDARD_NO_PAD
        .decode(token.trim())
        .map_err(|e| AppError::Unauthenticated(format!("error occured while parsing token: {}", e)))?;
    let text = String::from_utf8(decoded)
        .map_err(|_| AppError::Unauthenticated("error occured while parsing token".to_string()))?;

    let mut fields = text.split('|');
    let (Some(id), Some(role), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AppError::Unauthenticated(
            "error occured while parsing token".to_string(),
        ));
    };

    let subject_id = id
        .parse::<i64>()
        .map_err(|_| AppError::Unauthenticated("error occured while parsing userID".to_string()))?;
    let role = role
        .parse::<Role>()
        .map_err(|e| ClinicError::Validation(e.to_string()))?;

    Ok(Identity { subject_id, role })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_resolve() {
        let token = issue_token(42, Role::Doctor);

        assert_eq!(
            resolve_token(&token).unwrap(),
            Identity {
                subject_id: 42,
                role: Role::Doctor
            }
        );
    }

    #[test]
    fn role_in_token_is_case_insensitive() {
        let token = STANDARD_NO_PAD.encode("7|Patient");

        assert_eq!(resolve_token(&token).unwrap().role, Role::Patient);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for raw in ["7", "x|doctor", "7|doctor|extra"] {
            let token = STANDARD_NO_PAD.encode(raw);
            assert!(matches!(
                resolve_token(&token),
                Err(AppError::Unauthenticated(_))
            ));
        }
        assert!(resolve_token("not base64!").is_err());
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        let token = STANDARD_NO_PAD.encode("7|nurse");

        match resolve_token(&token) {
            Err(AppError::Clinic(err)) => {
                assert_eq!(err.message(), "unknown usertype 'nurse'");
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}
