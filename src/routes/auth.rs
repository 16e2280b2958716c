use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{LoginRequest, SignupRequest, TokenResponse, UpdateProfileRequest};
use crate::models::role::Role;
use crate::services::user_service::{NewUser, UserChanges, UserService};
use crate::utils::{jwt, password};

/// POST /signup - Créer un compte (PUBLIC)
#[post("/signup")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    // 1. Rôle : élève par défaut, jamais admin en libre-service
    let role = match body.role {
        Some(value) => Role::try_from(value).map_err(AppError::Validation)?,
        None => Role::Student,
    };
    if role == Role::Admin {
        return Err(AppError::Forbidden("Cannot sign up as admin".into()));
    }

    // 2. Créer l'utilisateur (email unique, mot de passe hashé)
    let user = UserService::create(
        db.get_ref(),
        NewUser {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            picture: body.picture,
            role,
            jetons: 0,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "user": user })))
}

/// POST /login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    // 1. Trouver l'utilisateur : même message si l'email est inconnu
    let user = UserService::find_by_email(db.get_ref(), &body.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // 2. Vérifier le mot de passe
    let is_valid = password::verify_password(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !is_valid {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    // 3. Générer le JWT
    let token = jwt::generate_token(user.id, &user.email, &config.jwt_secret, config.token_ttl_hours)
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /logout - Sans état côté serveur, le client oublie son token
#[post("/logout")]
pub async fn logout(_auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out successfully"
    }))
}

/// GET /profile - Profil complet de l'utilisateur connecté
#[get("/profile")]
pub async fn profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::find(db.get_ref(), auth_user.user_id).await?;
    let profile = UserService::profile(db.get_ref(), user).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": profile })))
}

/// PUT /profile/update - Mise à jour partielle du profil
#[put("/profile/update")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let mut body = body.into_inner();
    // Un email vide signifie "inchangé", sinon il doit être bien formé
    body.email = body.email.filter(|e| !e.trim().is_empty());
    body.validate()?;
    if let Some(ref pwd) = body.password {
        if !pwd.is_empty() && pwd.len() < 6 {
            return Err(AppError::Validation("password must be at least 6 characters".into()));
        }
    }

    let user = UserService::find(db.get_ref(), auth_user.user_id).await?;
    let changes = UserChanges {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        password: body.password,
        picture: body.picture,
        ..Default::default()
    };
    let user = UserService::update(db.get_ref(), user, changes).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(logout)
        .service(profile)
        .service(update_profile);
}
