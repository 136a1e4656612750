use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::generation::Generation;
use crate::domain::types::Style;
use crate::domain::user::User;

/// JSON representation of a stored generation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationView {
    pub id: String,
    /// Public id of the owner.
    pub user_id: String,
    pub prompt: String,
    pub style: Style,
    pub image_url: String,
    pub uploaded_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationView {
    /// Builds the view of a generation owned by `owner`.
    pub fn new(generation: Generation, owner: &User) -> Self {
        Self {
            id: generation.public_id.to_string(),
            user_id: owner.public_id.to_string(),
            prompt: generation.prompt.into_inner(),
            style: generation.style,
            image_url: generation.image_url.into_inner(),
            uploaded_image: generation.uploaded_image.map(|url| url.into_inner()),
            created_at: generation.created_at,
        }
    }
}
