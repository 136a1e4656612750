use chrono::{DateTime, SubsecRound, Utc};

use crate::domain::types::{GenerationId, ImageUrl, PublicId, Prompt, Style, UserId};

/// A completed (simulated) image generation owned by a user.
#[derive(Clone, Debug, PartialEq)]
pub struct Generation {
    pub id: GenerationId,
    pub public_id: PublicId,
    pub user_id: UserId,
    pub prompt: Prompt,
    pub style: Style,
    pub image_url: ImageUrl,
    /// Reference image supplied by the user, if any.
    pub uploaded_image: Option<ImageUrl>,
    pub created_at: DateTime<Utc>,
}

/// Generation record ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewGeneration {
    pub public_id: PublicId,
    pub user_id: UserId,
    pub prompt: Prompt,
    pub style: Style,
    pub image_url: ImageUrl,
    pub uploaded_image: Option<ImageUrl>,
    pub created_at: DateTime<Utc>,
}

impl NewGeneration {
    /// Creates a generation stamped with the current time and a fresh public id.
    #[must_use]
    pub fn new(
        user_id: UserId,
        prompt: Prompt,
        style: Style,
        image_url: ImageUrl,
        uploaded_image: Option<ImageUrl>,
    ) -> Self {
        Self {
            public_id: PublicId::new(),
            user_id,
            prompt,
            style,
            image_url,
            uploaded_image,
            // SQLite keeps microseconds, so both backends agree on the value.
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
