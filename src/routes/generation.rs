use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, ResponseError, get, post, web};

use crate::forms::generation::{GenerateForm, GeneratePayload};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::HistoryConfig;
use crate::repository::Repository;
use crate::services::ServiceError;
use crate::services::generation as generation_service;
use crate::simulator::GenerationSimulator;
use crate::uploads::UploadStore;

#[post("/generate")]
pub async fn generate(
    user: AuthenticatedUser,
    repo: web::Data<dyn Repository>,
    simulator: web::Data<GenerationSimulator>,
    uploads: web::Data<UploadStore>,
    history: web::Data<HistoryConfig>,
    MultipartForm(form): MultipartForm<GenerateForm>,
) -> impl Responder {
    let payload = match GeneratePayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => return ServiceError::from(err).error_response(),
    };

    match generation_service::generate(
        repo.get_ref(),
        &simulator,
        &uploads,
        &history,
        &user,
        payload,
    )
    .await
    {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => err.error_response(),
    }
}

#[get("/generations")]
pub async fn list_generations(
    user: AuthenticatedUser,
    repo: web::Data<dyn Repository>,
    history: web::Data<HistoryConfig>,
) -> impl Responder {
    match generation_service::list_history(repo.get_ref(), &history, &user) {
        Ok(views) => HttpResponse::Ok().json(views),
        Err(err) => err.error_response(),
    }
}

#[get("/generations/{generation_id}")]
pub async fn show_generation(
    user: AuthenticatedUser,
    generation_id: web::Path<String>,
    repo: web::Data<dyn Repository>,
) -> impl Responder {
    match generation_service::get_generation(repo.get_ref(), &user, &generation_id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => err.error_response(),
    }
}
