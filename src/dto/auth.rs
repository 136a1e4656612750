use serde::Serialize;

use crate::domain::user::User;

/// Public view of a user; never includes the password hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: String,
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id.to_string(),
            username: user.username.as_str().to_string(),
        }
    }
}

/// Response of the sign-up and log-in endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}
