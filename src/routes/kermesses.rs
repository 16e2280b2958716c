use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AddStandsRequest, AddUsersRequest, CreateKermesseRequest, UpdateKermesseRequest};
use crate::models::kermesse;
use crate::services::kermesse_service::{KermesseService, MemberKind};
use crate::services::policy::{self, Action};

/// POST /create-kermesse - Créer une kermesse (ADMIN / ORGANISATEUR)
#[post("/create-kermesse")]
pub async fn create_kermesse(
    auth_user: AuthUser,
    body: web::Json<CreateKermesseRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::CreateKermesse, false)?;
    body.validate()?;
    let body = body.into_inner();

    let new_kermesse = kermesse::ActiveModel {
        name: Set(body.name),
        picture: Set(body.picture),
        user_id: Set(auth_user.user_id),
        ..Default::default()
    };
    let kermesse = new_kermesse.insert(db.get_ref()).await?;

    tracing::info!(kermesse_id = kermesse.id, user_id = auth_user.user_id, "kermesse created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "kermesse": kermesse })))
}

/// GET /kermesses - Kermesses visibles par l'utilisateur connecté
#[get("/kermesses")]
pub async fn list_kermesses(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let kermesses = KermesseService::list_for(db.get_ref(), &auth_user).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "kermesses": kermesses })))
}

/// GET /kermesses/{id} - Détail avec organisateurs, participants et stands
#[get("/kermesses/{id}")]
pub async fn get_kermesse(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let kermesse = KermesseService::find(db.get_ref(), path.into_inner()).await?;

    // Créateur, organisateur ou participant
    let is_member = kermesse.user_id == auth_user.user_id
        || KermesseService::is_organizer(db.get_ref(), kermesse.id, auth_user.user_id).await?
        || KermesseService::is_participant(db.get_ref(), kermesse.id, auth_user.user_id).await?;
    policy::check(&auth_user, Action::ViewKermesse, is_member)?;

    let detail = KermesseService::detail(db.get_ref(), kermesse).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "kermesse": detail })))
}

/// PUT /kermesses/{id}/update - Mise à jour partielle (ADMIN / CRÉATEUR)
#[put("/kermesses/{id}/update")]
pub async fn update_kermesse(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateKermesseRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    let kermesse = KermesseService::find(db.get_ref(), path.into_inner()).await?;
    policy::check(&auth_user, Action::UpdateKermesse, kermesse.user_id == auth_user.user_id)?;

    let mut active: kermesse::ActiveModel = kermesse.clone().into();
    if let Some(name) = body.name {
        active.name = Set(name);
    }
    if let Some(picture) = body.picture.filter(|p| !p.is_empty()) {
        active.picture = Set(Some(picture));
    }

    let kermesse = if active.is_changed() {
        active.update(db.get_ref()).await?
    } else {
        kermesse
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "kermesse": kermesse })))
}

/// DELETE /kermesses/{id}/delete - Supprimer une kermesse (ADMIN / CRÉATEUR)
#[delete("/kermesses/{id}/delete")]
pub async fn delete_kermesse(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let kermesse = KermesseService::find(db.get_ref(), path.into_inner()).await?;
    policy::check(&auth_user, Action::DeleteKermesse, kermesse.user_id == auth_user.user_id)?;

    KermesseService::delete(db.get_ref(), kermesse.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Kermesse deleted successfully"
    })))
}

/// Créateur ou organisateur existant
async fn can_manage_members(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    kermesse: &kermesse::Model,
) -> Result<(), AppError> {
    let is_manager = kermesse.user_id == auth_user.user_id
        || KermesseService::is_organizer(db, kermesse.id, auth_user.user_id).await?;
    policy::check(auth_user, Action::ManageKermesseMembers, is_manager)
}

/// POST /kermesses/{id}/add-stands - Rattacher des stands
#[post("/kermesses/{id}/add-stands")]
pub async fn add_stands(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<AddStandsRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let kermesse = KermesseService::find(db.get_ref(), path.into_inner()).await?;
    can_manage_members(db.get_ref(), &auth_user, &kermesse).await?;
    body.validate()?;

    let added = KermesseService::add_stands(db.get_ref(), kermesse.id, &body.stand_ids).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Stands added successfully",
        "added": added
    })))
}

/// POST /kermesses/{id}/add-users - Ajouter des participants ou des organisateurs
#[post("/kermesses/{id}/add-users")]
pub async fn add_users(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<AddUsersRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let kermesse = KermesseService::find(db.get_ref(), path.into_inner()).await?;
    can_manage_members(db.get_ref(), &auth_user, &kermesse).await?;

    let kind = MemberKind::parse(&body.kind)?;
    body.validate()?;

    let added = KermesseService::add_users(db.get_ref(), kermesse.id, kind, &body.user_ids).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Users added successfully",
        "added": added
    })))
}

pub fn kermesses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_kermesse)
        .service(list_kermesses)
        .service(get_kermesse)
        .service(update_kermesse)
        .service(delete_kermesse)
        .service(add_stands)
        .service(add_users);
}
