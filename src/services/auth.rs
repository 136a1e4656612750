//! Account registration, log-in and token resolution.

use chrono::Duration;

use crate::domain::types::{PasswordHash, Username};
use crate::domain::user::{NewUser, User};
use crate::dto::auth::{AuthResponse, UserView};
use crate::forms::auth::{LoginForm, LoginPayload, SignupForm, SignupPayload};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::AuthConfig;
use crate::repository::errors::RepositoryError;
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

fn issue_response(user: &User, settings: &AuthConfig) -> ServiceResult<AuthResponse> {
    let token = AuthenticatedUser::issue(user, Duration::hours(settings.token_ttl_hours))
        .to_jwt(&settings.secret)
        .map_err(|err| ServiceError::Internal(format!("Failed to sign token: {err}")))?;

    Ok(AuthResponse {
        user: UserView::from(user),
        token,
    })
}

/// Registers a new account and signs a token for it.
pub fn signup<R>(repo: &R, settings: &AuthConfig, form: SignupForm) -> ServiceResult<AuthResponse>
where
    R: UserReader + UserWriter + ?Sized,
{
    let payload = SignupPayload::try_from(form)?;

    if repo.get_user_by_username(&payload.username)?.is_some() {
        return Err(ServiceError::UsernameTaken);
    }

    let hash = bcrypt::hash(&payload.password, settings.bcrypt_cost)
        .map_err(|err| ServiceError::Internal(format!("Failed to hash password: {err}")))?;
    let new_user = NewUser::new(payload.username, PasswordHash::new(hash)?);

    let user = match repo.create_user(&new_user) {
        Ok(user) => user,
        // Lost a race with a concurrent sign-up for the same name.
        Err(RepositoryError::ConstraintViolation(_)) => return Err(ServiceError::UsernameTaken),
        Err(err) => return Err(err.into()),
    };

    log::info!("Registered user {}", user.username);

    issue_response(&user, settings)
}

/// Checks the credentials and signs a fresh token.
///
/// A name that no account could have is rejected without a lookup.
pub fn login<R>(repo: &R, settings: &AuthConfig, form: LoginForm) -> ServiceResult<AuthResponse>
where
    R: UserReader + ?Sized,
{
    let payload = LoginPayload::try_from(form)?;

    let Ok(username) = Username::new(payload.username) else {
        return Err(ServiceError::InvalidCredentials);
    };

    let user = repo
        .get_user_by_username(&username)?
        .ok_or(ServiceError::InvalidCredentials)?;

    let valid = bcrypt::verify(&payload.password, user.password_hash.as_str())
        .map_err(|err| ServiceError::Internal(format!("Failed to verify password: {err}")))?;

    if !valid {
        log::info!("Rejected log-in for {}", user.username);
        return Err(ServiceError::InvalidCredentials);
    }

    issue_response(&user, settings)
}

/// Loads the account behind a verified token.
///
/// Tokens outlive accounts, so a missing user is reported as an invalid token.
pub fn resolve_user<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let public_id = auth
        .public_id()
        .map_err(|_| ServiceError::Unauthorized)?;

    repo.get_user_by_public_id(&public_id)?
        .ok_or(ServiceError::Unauthorized)
}

/// Returns the public profile of the authenticated user.
pub fn current_user<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<UserView>
where
    R: UserReader + ?Sized,
{
    let user = resolve_user(repo, auth)?;
    Ok(UserView::from(&user))
}
