//! Diesel models representing users.

use diesel::prelude::*;

use crate::domain::types::{PasswordHash, PublicId, TypeConstraintError, UserId, Username};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub public_id: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// Insertable form of [`User`].
pub struct NewUser<'a> {
    pub public_id: String,
    pub username: &'a str,
    pub password_hash: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            public_id: user.public_id.parse::<PublicId>()?,
            username: Username::new(user.username)?,
            password_hash: PasswordHash::new(user.password_hash)?,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            public_id: user.public_id.to_string(),
            username: user.username.as_str(),
            password_hash: user.password_hash.as_str(),
        }
    }
}
