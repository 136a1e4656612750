//! Simulated image generation and per-user history.

use crate::domain::generation::NewGeneration;
use crate::domain::types::PublicId;
use crate::dto::generation::GenerationView;
use crate::forms::generation::GeneratePayload;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::HistoryConfig;
use crate::repository::{GenerationListQuery, GenerationReader, GenerationWriter, UserReader};
use crate::services::auth::resolve_user;
use crate::services::{ServiceError, ServiceResult};
use crate::simulator::GenerationSimulator;
use crate::uploads::UploadStore;

/// Runs a simulated generation for the authenticated user and records it.
///
/// If the caller disconnects while the simulator is "rendering", actix drops
/// this future and nothing is stored.
pub async fn generate<R>(
    repo: &R,
    simulator: &GenerationSimulator,
    uploads: &UploadStore,
    history: &HistoryConfig,
    auth: &AuthenticatedUser,
    payload: GeneratePayload,
) -> ServiceResult<GenerationView>
where
    R: UserReader + GenerationWriter + ?Sized,
{
    let user = resolve_user(repo, auth)?;

    if let Some(image) = &payload.image {
        UploadStore::ensure_image(image)?;
    }

    if simulator.should_fail() {
        log::warn!("Simulated overload for user {}", user.username);
        return Err(ServiceError::Overloaded);
    }

    let image_url = simulator.render().await;

    let uploaded_image = payload
        .image
        .as_ref()
        .map(|file| uploads.store(file))
        .transpose()?;

    let new_generation = NewGeneration::new(
        user.id,
        payload.prompt,
        payload.style,
        image_url,
        uploaded_image,
    );
    let generation = repo.create_generation(&new_generation)?;

    if let Some(keep) = history.retention {
        match repo.prune_generations(user.id, keep) {
            Ok(0) => {}
            Ok(pruned) => log::debug!("Pruned {pruned} old generation(s) of {}", user.username),
            Err(err) => log::error!("Failed to prune generations of {}: {err}", user.username),
        }
    }

    Ok(GenerationView::new(generation, &user))
}

/// Returns the newest generations of the authenticated user.
pub fn list_history<R>(
    repo: &R,
    history: &HistoryConfig,
    auth: &AuthenticatedUser,
) -> ServiceResult<Vec<GenerationView>>
where
    R: UserReader + GenerationReader + ?Sized,
{
    let user = resolve_user(repo, auth)?;

    let generations =
        repo.list_generations(GenerationListQuery::new(user.id).limit(history.limit))?;

    Ok(generations
        .into_iter()
        .map(|generation| GenerationView::new(generation, &user))
        .collect())
}

/// Fetches one generation, only if it belongs to the authenticated user.
pub fn get_generation<R>(
    repo: &R,
    auth: &AuthenticatedUser,
    generation_id: &str,
) -> ServiceResult<GenerationView>
where
    R: UserReader + GenerationReader + ?Sized,
{
    let user = resolve_user(repo, auth)?;

    let Ok(public_id) = generation_id.parse::<PublicId>() else {
        return Err(ServiceError::NotFound);
    };

    let generation = repo
        .get_generation_by_public_id(&public_id)?
        .ok_or(ServiceError::NotFound)?;

    if generation.user_id != user.id {
        log::warn!(
            "User {} attempted to read generation {} of another user",
            user.username,
            public_id
        );
        return Err(ServiceError::Forbidden);
    }

    Ok(GenerationView::new(generation, &user))
}
