//! Diesel models for stored generations.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::generation::{
    Generation as DomainGeneration, NewGeneration as DomainNewGeneration,
};
use crate::domain::types::{
    GenerationId, ImageUrl, Prompt, PublicId, Style, TypeConstraintError, UserId,
};
use crate::models::user::User;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = crate::schema::generations)]
/// Diesel model for [`crate::domain::generation::Generation`].
pub struct Generation {
    pub id: i32,
    pub public_id: String,
    pub user_id: i32,
    pub prompt: String,
    pub style: String,
    pub image_url: String,
    pub uploaded_image: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::generations)]
/// Insertable form of [`Generation`].
pub struct NewGeneration<'a> {
    pub public_id: String,
    pub user_id: i32,
    pub prompt: &'a str,
    pub style: &'a str,
    pub image_url: &'a str,
    pub uploaded_image: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Generation> for DomainGeneration {
    type Error = TypeConstraintError;

    fn try_from(generation: Generation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GenerationId::try_from(generation.id)?,
            public_id: generation.public_id.parse::<PublicId>()?,
            user_id: UserId::try_from(generation.user_id)?,
            prompt: Prompt::new(generation.prompt)?,
            style: generation.style.parse::<Style>()?,
            image_url: ImageUrl::new(generation.image_url)?,
            uploaded_image: generation.uploaded_image.map(ImageUrl::new).transpose()?,
            created_at: generation.created_at.and_utc(),
        })
    }
}

impl<'a> From<&'a DomainNewGeneration> for NewGeneration<'a> {
    fn from(generation: &'a DomainNewGeneration) -> Self {
        Self {
            public_id: generation.public_id.to_string(),
            user_id: generation.user_id.get(),
            prompt: generation.prompt.as_str(),
            style: generation.style.as_str(),
            image_url: generation.image_url.as_str(),
            uploaded_image: generation.uploaded_image.as_ref().map(|url| url.as_str()),
            created_at: generation.created_at.naive_utc(),
        }
    }
}
