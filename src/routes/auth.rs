use actix_web::{HttpResponse, Responder, ResponseError, get, post, web};

use crate::forms::auth::{LoginForm, SignupForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::AuthConfig;
use crate::repository::Repository;
use crate::services::auth as auth_service;

#[post("/auth/signup")]
pub async fn signup(
    repo: web::Data<dyn Repository>,
    settings: web::Data<AuthConfig>,
    form: web::Json<SignupForm>,
) -> impl Responder {
    match auth_service::signup(repo.get_ref(), &settings, form.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => err.error_response(),
    }
}

#[post("/auth/login")]
pub async fn login(
    repo: web::Data<dyn Repository>,
    settings: web::Data<AuthConfig>,
    form: web::Json<LoginForm>,
) -> impl Responder {
    match auth_service::login(repo.get_ref(), &settings, form.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => err.error_response(),
    }
}

#[get("/auth/me")]
pub async fn me(user: AuthenticatedUser, repo: web::Data<dyn Repository>) -> impl Responder {
    match auth_service::current_user(repo.get_ref(), &user) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => err.error_response(),
    }
}
