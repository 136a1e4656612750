//! Credentials submitted to the sign-up and log-in endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::Username;
use crate::forms::FormError;

/// Fields of both credential bodies, in the order their errors are reported.
const CREDENTIAL_FIELDS: &[&str] = &["username", "password"];

#[derive(Debug, Deserialize, Validate)]
/// JSON body of `POST /api/auth/signup`.
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Validated sign-up request.
pub struct SignupPayload {
    pub username: Username,
    pub password: String,
}

impl TryFrom<SignupForm> for SignupPayload {
    type Error = FormError;

    fn try_from(form: SignupForm) -> Result<Self, Self::Error> {
        form.validate()
            .map_err(|errors| FormError::first_of(&errors, CREDENTIAL_FIELDS))?;

        let username = Username::new(form.username)
            .map_err(|err| FormError::Validation(format!("Invalid username: {err}")))?;

        Ok(Self {
            username,
            password: form.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// JSON body of `POST /api/auth/login`.
///
/// Only absent fields are rejected here; empty strings are checked against
/// the stored accounts like any other credentials.
pub struct LoginForm {
    #[validate(required(message = "Username is required"))]
    pub username: Option<String>,
    #[validate(required(message = "Password is required"))]
    pub password: Option<String>,
}

/// Log-in request with both fields present.
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()
            .map_err(|errors| FormError::first_of(&errors, CREDENTIAL_FIELDS))?;

        Ok(Self {
            username: form.username.unwrap_or_default(),
            password: form.password.unwrap_or_default(),
        })
    }
}
