use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AddChildrenRequest, CreateUserRequest, GiveCoinsRequest, UpdateUserRequest};
use crate::models::role::Role;
use crate::models::users;
use crate::services::ledger_service::LedgerService;
use crate::services::policy::{self, Action};
use crate::services::user_service::{NewUser, UserChanges, UserService};

/// POST /api/users - Créer un utilisateur (ADMIN)
#[post("")]
pub async fn create_user(
    auth_user: AuthUser,
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::CreateUser, false)?;
    body.validate()?;
    let body = body.into_inner();

    let role = Role::try_from(body.role).map_err(AppError::Validation)?;
    let user = UserService::create(
        db.get_ref(),
        NewUser {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            picture: body.picture,
            role,
            jetons: body.jetons.unwrap_or(0),
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "user": user })))
}

/// GET /api/users - Lister les utilisateurs (ADMIN)
#[get("")]
pub async fn list_users(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ListUsers, false)?;

    let users = users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(db.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "users": users })))
}

/// GET /api/users/{id} - Profil d'un utilisateur (ADMIN)
#[get("/{id}")]
pub async fn get_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::ViewUser, false)?;

    let user = UserService::find(db.get_ref(), path.into_inner()).await?;
    let profile = UserService::profile(db.get_ref(), user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": profile })))
}

/// PUT /api/users/{id} - Mise à jour partielle (ADMIN)
#[put("/{id}")]
pub async fn update_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::UpdateUser, false)?;
    body.validate()?;
    let body = body.into_inner();

    let role = body
        .role
        .map(Role::try_from)
        .transpose()
        .map_err(AppError::Validation)?;

    let user = UserService::find(db.get_ref(), path.into_inner()).await?;
    let changes = UserChanges {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        password: body.password,
        picture: body.picture,
        role,
        jetons: body.jetons,
        pts_attribues: body.pts_attribues,
    };
    let user = UserService::update(db.get_ref(), user, changes).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}

/// DELETE /api/users/{id} - Supprimer un utilisateur et ses dépendances (ADMIN)
#[delete("/{id}")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::DeleteUser, false)?;

    let user = UserService::find(db.get_ref(), path.into_inner()).await?;
    UserService::delete(db.get_ref(), user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully"
    })))
}

/// POST /api/users/{id}/give-coins - Transfert parent -> enfant (PARENT)
#[post("/{id}/give-coins")]
pub async fn give_coins(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<GiveCoinsRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::GiveCoins, false)?;
    body.validate()?;

    let outcome =
        LedgerService::transfer_to_child(db.get_ref(), auth_user.user_id, path.into_inner(), body.nb_jetons)
            .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /add-children - Lier des enfants au parent connecté (PARENT)
#[post("/add-children")]
pub async fn add_children(
    auth_user: AuthUser,
    body: web::Json<AddChildrenRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    policy::check(&auth_user, Action::LinkChildren, false)?;
    body.validate()?;

    let linked = UserService::link_children(db.get_ref(), auth_user.user_id, &body.children_ids).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Children added successfully",
        "children": linked
    })))
}

/// GET /students - Lister les élèves (CONNECTÉ)
#[get("/students")]
pub async fn list_students(
    _auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let students = UserService::students(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "students": students })))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_children)
        .service(list_students)
        .service(
            web::scope("/api/users")
                .service(create_user)
                .service(list_users)
                .service(give_coins)
                .service(get_user)
                .service(update_user)
                .service(delete_user),
        );
}
