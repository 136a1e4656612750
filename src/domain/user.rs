use crate::domain::types::{PasswordHash, PublicId, UserId, Username};

/// Registered studio user.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub public_id: PublicId,
    pub username: Username,
    pub password_hash: PasswordHash,
}

/// User record ready to be persisted.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub public_id: PublicId,
    pub username: Username,
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Creates a new user payload with a freshly generated public id.
    #[must_use]
    pub fn new(username: Username, password_hash: PasswordHash) -> Self {
        Self {
            public_id: PublicId::new(),
            username,
            password_hash,
        }
    }
}
